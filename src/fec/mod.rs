// Copyright (c) 2024, The Fountain Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! # Systematic Fountain Codec
//!
//! RaptorQ-style erasure code over GF(256). A source block of K symbols is
//! padded to K', expanded into L = K'+S+H intermediate symbols that satisfy
//! the LDPC, HDPC and source constraints, and repair symbols are drawn from
//! those intermediate symbols on demand. Any K'+2 or so encoding symbols
//! recover the block with overwhelming probability.

pub mod decoder;
pub mod encoder;
pub mod gf_tables;
pub mod matrix;
pub mod packet;
pub mod params;
pub mod solver;
pub mod symbol;
pub mod tuple;

pub use decoder::{DecodeStatus, Decoder, DecoderState, SharedDecoder};
pub use encoder::{Encoder, EncodingPlan};
pub use gf_tables::{gf_add, gf_div, gf_exp, gf_inv, gf_mul, init_gf_tables};
pub use matrix::{ConstraintMatrix, SparseRow};
pub use packet::{EncodingPacket, PayloadId, TransmissionInfo, MAX_ESI};
pub use params::{CodeParameters, CODEBOOK_VERSION, MAX_SOURCE_SYMBOLS};
pub use solver::{plan, solve, Solution, SolvePlan, SymbolOp};
pub use symbol::Symbol;
pub use tuple::{tuple_for, Tuple};
