// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// ============================================================================
// Reader
// ============================================================================

/// A pull-based character source for the tokenizer.  Yields one
/// character per call and `'\0'` once the input is exhausted; the
/// sentinel persists for every call thereafter.
pub trait Reader {
    fn next(&mut self) -> char;
}

/// A reader over in-memory text.
pub struct StrReader<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> StrReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
        }
    }
}

impl<'a> Reader for StrReader<'a> {
    fn next(&mut self) -> char {
        self.chars.next().unwrap_or('\0')
    }
}

// ============================================================================
// Tests
// ============================================================================
