use crate::error::{FountainError, Result};
use crate::fec::matrix::ConstraintMatrix;
use crate::fec::packet::{EncodingPacket, PayloadId, TransmissionInfo, MAX_ESI};
use crate::fec::params::CodeParameters;
use crate::fec::solver::{plan, SolvePlan};
use crate::fec::symbol::Symbol;
use crate::fec::tuple::tuple_for;
use crate::telemetry;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Recorded systematic solve for one padded block size.
///
/// The elimination depends only on K', so a plan generated once can build
/// encoders for any payload whose K pads to the same K', whatever its
/// length and symbol size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingPlan {
    params: CodeParameters,
    solve: SolvePlan,
}

impl EncodingPlan {
    pub fn generate(source_symbols: usize) -> Result<Self> {
        let params = CodeParameters::for_source_count(source_symbols)?;
        let matrix = ConstraintMatrix::new(params.clone());
        let sparse = matrix.sparse_system(0..params.k_prime as u32);
        let solve = plan(&params, &sparse, matrix.hdpc_rows())?;
        debug!(
            "encoding plan for K'={}: {} operations, {} inactive columns",
            params.k_prime,
            solve.operations(),
            solve.inactivated()
        );
        Ok(Self { params, solve })
    }

    pub fn params(&self) -> &CodeParameters {
        &self.params
    }

    pub fn operations(&self) -> usize {
        self.solve.operations()
    }
}

fn block_info(payload: &[u8], symbol_size: usize) -> Result<TransmissionInfo> {
    if payload.is_empty() {
        return Err(FountainError::Config("payload is empty".into()));
    }
    if symbol_size == 0 {
        return Err(FountainError::Config("symbol size must be positive".into()));
    }
    let t = u16::try_from(symbol_size).map_err(|_| {
        FountainError::Config(format!("symbol size {} exceeds {}", symbol_size, u16::MAX))
    })?;
    TransmissionInfo::new(payload.len() as u64, t)
}

/// Systematic encoder for one source block.
///
/// Intermediate symbols are computed once in [`Encoder::construct`]; after
/// that the encoder is immutable and any number of threads may pull symbols
/// from it.
#[derive(Debug)]
pub struct Encoder {
    info: TransmissionInfo,
    params: CodeParameters,
    source: Vec<Symbol>,
    intermediate: Vec<Symbol>,
}

impl Encoder {
    pub fn construct(payload: &[u8], symbol_size: usize) -> Result<Self> {
        let info = block_info(payload, symbol_size)?;
        let plan = EncodingPlan::generate(info.source_symbols())?;
        Self::with_plan(payload, symbol_size, &plan)
    }

    /// Builds the encoder by replaying `plan` instead of eliminating again.
    pub fn with_plan(payload: &[u8], symbol_size: usize, plan: &EncodingPlan) -> Result<Self> {
        let info = block_info(payload, symbol_size)?;
        let k = info.source_symbols();
        let params = CodeParameters::for_source_count(k)?;
        if params != plan.params {
            return Err(FountainError::MismatchedParameters(format!(
                "plan is for K'={}, payload needs K'={}",
                plan.params.k_prime, params.k_prime
            )));
        }

        let source: Vec<Symbol> = payload
            .chunks(symbol_size)
            .map(|chunk| Symbol::padded(chunk, symbol_size))
            .collect();

        let mut rhs = Vec::with_capacity(params.l());
        rhs.extend(std::iter::repeat_with(|| Symbol::zero(symbol_size)).take(params.s));
        rhs.extend(source.iter().cloned());
        rhs.extend(std::iter::repeat_with(|| Symbol::zero(symbol_size)).take(params.k_prime - k + params.h));

        let start = Instant::now();
        let intermediate = plan.solve.apply(rhs)?;
        telemetry::SOLVE_SECONDS.observe(start.elapsed().as_secs_f64());
        debug!(
            "encoder: K={} K'={} T={} replayed {} operations in {:?}",
            k,
            params.k_prime,
            symbol_size,
            plan.operations(),
            start.elapsed()
        );

        Ok(Self {
            info,
            params,
            source,
            intermediate,
        })
    }

    pub fn transmission_info(&self) -> TransmissionInfo {
        self.info
    }

    pub fn params(&self) -> &CodeParameters {
        &self.params
    }

    /// Number of source symbols K.
    pub fn source_symbols(&self) -> usize {
        self.source.len()
    }

    pub fn symbol_size(&self) -> usize {
        self.info.symbol_size() as usize
    }

    pub fn intermediate_symbols(&self) -> &[Symbol] {
        &self.intermediate
    }

    /// First repair ESI, K'.
    pub fn first_repair_esi(&self) -> u32 {
        self.params.k_prime as u32
    }

    /// Combination of intermediate symbols selected by the tuple of `esi`.
    pub(crate) fn combine(&self, esi: u32) -> Symbol {
        let mut out = Symbol::zero(self.symbol_size());
        for (col, coef) in tuple_for(&self.params, esi) {
            out.mul_add_assign(&self.intermediate[col], coef);
        }
        out
    }

    /// Source symbol `esi` for esi < K, repair symbol for esi >= K'.
    pub fn get_symbol(&self, esi: u32) -> Result<Symbol> {
        let k = self.source.len() as u32;
        if esi < k {
            return Ok(self.source[esi as usize].clone());
        }
        if esi < self.first_repair_esi() || esi > MAX_ESI {
            return Err(FountainError::InvalidSymbolId(esi));
        }
        Ok(self.combine(esi))
    }

    pub fn packet(&self, esi: u32) -> Result<EncodingPacket> {
        let symbol = self.get_symbol(esi)?;
        if esi < self.source.len() as u32 {
            telemetry::SOURCE_SYMBOLS_ENCODED.inc();
        } else {
            telemetry::REPAIR_SYMBOLS_ENCODED.inc();
        }
        Ok(EncodingPacket::new(PayloadId::new(0, esi)?, symbol.into_bytes()))
    }

    /// All K source packets followed by `repair` repair packets (ESIs K'..K'+repair).
    pub fn get_encoded_packets(&self, repair: u32) -> Vec<EncodingPacket> {
        let first = self.first_repair_esi();
        let available = MAX_ESI - first + 1;
        if repair > available {
            warn!("requested {} repair symbols, ESI space allows {}", repair, available);
        }
        let repair = repair.min(available);

        let mut packets: Vec<EncodingPacket> = (0..self.source.len() as u32)
            .filter_map(|esi| self.packet(esi).ok())
            .collect();
        let repairs: Vec<EncodingPacket> = (first..first + repair)
            .into_par_iter()
            .filter_map(|esi| self.packet(esi).ok())
            .collect();
        packets.extend(repairs);
        packets
    }

    /// Unbounded stream of repair packets starting `offset` symbols after K'.
    pub fn repair_packets(&self, offset: u32) -> impl Iterator<Item = EncodingPacket> + '_ {
        let first = self.first_repair_esi().saturating_add(offset);
        (first..=MAX_ESI).filter_map(move |esi| self.packet(esi).ok())
    }

    /// Writes the framed packet for `esi` into `buf`.
    pub fn encode_raw(&self, esi: u32, buf: &mut [u8]) -> Result<usize> {
        self.packet(esi)?.write_to(buf)
    }
}
