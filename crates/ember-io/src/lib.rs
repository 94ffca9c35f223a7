// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Ember IO
//!
//! Byte-level persistence helpers. The [`buffer`] module provides an
//! endian-aware writer/parser pair for the engine's primitive types; it is the
//! building block for save files and network payloads.

#![warn(missing_docs)]

pub mod buffer;

pub use buffer::{native_endianness, BufferParser, BufferWriter, Endianness};
