use crate::error::{FountainError, Result};
use crate::fec::matrix::{ConstraintMatrix, SparseRow};
use crate::fec::packet::{EncodingPacket, TransmissionInfo, MAX_ESI};
use crate::fec::params::CodeParameters;
use crate::fec::solver::solve;
use crate::fec::symbol::Symbol;
use crate::telemetry;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    Accumulating,
    Decoded,
    /// The last elimination was rank-deficient. The next new symbol retries.
    Failed,
}

/// Outcome of feeding one symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Duplicate symbol; nothing changed.
    Keep,
    /// Symbol recorded, block not yet recoverable.
    Step,
    /// Block recovered.
    Done,
}

#[derive(Debug)]
struct ReceivedRow {
    row: SparseRow,
    symbol: Symbol,
}

/// Decoder for one source block.
///
/// Received symbols are appended to an arena together with their constraint
/// row and indexed by ESI, so the system handed to the solver is always in
/// ESI order regardless of arrival and no row is generated twice.
#[derive(Debug)]
pub struct Decoder {
    info: TransmissionInfo,
    params: CodeParameters,
    matrix: ConstraintMatrix,
    rows: Vec<ReceivedRow>,
    by_esi: BTreeMap<u32, usize>,
    padding: Vec<SparseRow>,
    source_received: usize,
    state: DecoderState,
    aborted: bool,
    payload: Option<Vec<u8>>,
}

impl Decoder {
    pub fn new(transfer_length: u64, symbol_size: usize) -> Result<Self> {
        let t = u16::try_from(symbol_size).map_err(|_| {
            FountainError::Config(format!("symbol size {} exceeds {}", symbol_size, u16::MAX))
        })?;
        Self::with_info(TransmissionInfo::new(transfer_length, t)?)
    }

    pub fn with_info(info: TransmissionInfo) -> Result<Self> {
        let params = CodeParameters::for_source_count(info.source_symbols())?;
        let matrix = ConstraintMatrix::new(params.clone());
        let k = info.source_symbols() as u32;
        let padding = (k..params.k_prime as u32).map(|isi| matrix.tuple_for(isi)).collect();
        Ok(Self {
            info,
            params,
            matrix,
            rows: Vec::new(),
            by_esi: BTreeMap::new(),
            padding,
            source_received: 0,
            state: DecoderState::Accumulating,
            aborted: false,
            payload: None,
        })
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn params(&self) -> &CodeParameters {
        &self.params
    }

    pub fn transmission_info(&self) -> TransmissionInfo {
        self.info
    }

    pub fn received_count(&self) -> usize {
        self.rows.len()
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    fn source_symbols(&self) -> usize {
        self.info.source_symbols()
    }

    fn symbol_size(&self) -> usize {
        self.info.symbol_size() as usize
    }

    /// Feeds one framed packet. `Ok(None)` means more symbols are needed.
    pub fn decode(&mut self, packet: EncodingPacket) -> Result<Option<Vec<u8>>> {
        if self.state == DecoderState::Decoded {
            return Ok(self.payload.clone());
        }
        if packet.payload_id.source_block() != 0 {
            telemetry::REJECTED_SYMBOLS.inc();
            return Err(FountainError::MismatchedParameters(format!(
                "source block {} is not decoded here",
                packet.payload_id.source_block()
            )));
        }
        match self.add_symbol(packet.esi(), &packet.data)? {
            DecodeStatus::Done => Ok(self.payload.clone()),
            DecodeStatus::Keep | DecodeStatus::Step => Ok(None),
        }
    }

    /// Parses `raw` as an [`EncodingPacket`] frame and feeds it.
    pub fn decode_bytes(&mut self, raw: &[u8]) -> Result<Option<Vec<u8>>> {
        self.decode(EncodingPacket::from_bytes(raw)?)
    }

    /// Records `(esi, data)` and attempts elimination once enough rows exist.
    pub fn add_symbol(&mut self, esi: u32, data: &[u8]) -> Result<DecodeStatus> {
        if self.aborted {
            return Err(FountainError::Arithmetic("decoder session aborted"));
        }
        if self.state == DecoderState::Decoded {
            return Ok(DecodeStatus::Done);
        }
        if data.len() != self.symbol_size() {
            telemetry::REJECTED_SYMBOLS.inc();
            warn!(
                "rejecting ESI {}: {} bytes, expected {}",
                esi,
                data.len(),
                self.symbol_size()
            );
            return Err(FountainError::MismatchedParameters(format!(
                "symbol of {} bytes, expected {}",
                data.len(),
                self.symbol_size()
            )));
        }
        let k = self.source_symbols() as u32;
        if (esi >= k && esi < self.params.k_prime as u32) || esi > MAX_ESI {
            telemetry::REJECTED_SYMBOLS.inc();
            warn!("rejecting ESI {}: not an encoding symbol of this block", esi);
            return Err(FountainError::InvalidSymbolId(esi));
        }
        if self.by_esi.contains_key(&esi) {
            telemetry::DUPLICATE_SYMBOLS.inc();
            return Ok(DecodeStatus::Keep);
        }

        self.by_esi.insert(esi, self.rows.len());
        self.rows.push(ReceivedRow {
            row: self.matrix.tuple_for(esi),
            symbol: Symbol::new(data.to_vec()),
        });
        if esi < k {
            self.source_received += 1;
        }
        telemetry::SYMBOLS_RECEIVED.inc();
        self.state = DecoderState::Accumulating;
        self.try_decode()
    }

    fn try_decode(&mut self) -> Result<DecodeStatus> {
        let k = self.source_symbols();
        if self.source_received == k {
            debug!("all {} source symbols present, skipping elimination", k);
            let symbols: Vec<&Symbol> = self
                .by_esi
                .range(..k as u32)
                .map(|(_, &idx)| &self.rows[idx].symbol)
                .collect();
            let payload = self.assemble(symbols.into_iter());
            return Ok(self.finish(payload));
        }

        if self.rows.len() + self.padding.len() < self.params.k_prime {
            return Ok(DecodeStatus::Step);
        }

        // canonical order: LDPC, received sources, padding, repairs by ESI
        let t = self.symbol_size();
        let n = self.params.s + self.rows.len() + self.padding.len();
        let mut sparse: Vec<&[(usize, u8)]> = Vec::with_capacity(n);
        let mut rhs: Vec<Symbol> = Vec::with_capacity(n + self.params.h);
        for row in self.matrix.ldpc_rows() {
            sparse.push(row);
            rhs.push(Symbol::zero(t));
        }
        for (_, &idx) in self.by_esi.range(..k as u32) {
            sparse.push(&self.rows[idx].row);
            rhs.push(self.rows[idx].symbol.clone());
        }
        for row in &self.padding {
            sparse.push(row);
            rhs.push(Symbol::zero(t));
        }
        for (_, &idx) in self.by_esi.range(self.params.k_prime as u32..) {
            sparse.push(&self.rows[idx].row);
            rhs.push(self.rows[idx].symbol.clone());
        }
        rhs.extend(std::iter::repeat_with(|| Symbol::zero(t)).take(self.params.h));

        telemetry::DECODE_ATTEMPTS.inc();
        let start = Instant::now();
        let result = solve(&self.params, &sparse, self.matrix.hdpc_rows(), rhs);
        telemetry::SOLVE_SECONDS.observe(start.elapsed().as_secs_f64());

        match result {
            Ok(solution) => {
                telemetry::INACTIVATED_COLUMNS.inc_by(solution.inactivated as u64);
                let recovered: Vec<Symbol> = (0..k as u32)
                    .map(|isi| match self.by_esi.get(&isi) {
                        Some(&idx) => self.rows[idx].symbol.clone(),
                        None => self.combine(&solution.symbols, isi),
                    })
                    .collect();
                let payload = self.assemble(recovered.iter());
                Ok(self.finish(payload))
            }
            Err(FountainError::InsufficientSymbols { rank, needed }) => {
                debug!(
                    "elimination with {} symbols reached rank {} of {}",
                    self.rows.len(),
                    rank,
                    needed
                );
                self.state = DecoderState::Failed;
                Ok(DecodeStatus::Step)
            }
            Err(e) => {
                if e.is_fatal() {
                    self.aborted = true;
                    self.state = DecoderState::Failed;
                }
                Err(e)
            }
        }
    }

    fn combine(&self, intermediate: &[Symbol], isi: u32) -> Symbol {
        let mut out = Symbol::zero(self.symbol_size());
        for (col, coef) in self.matrix.tuple_for(isi) {
            out.mul_add_assign(&intermediate[col], coef);
        }
        out
    }

    fn assemble<'a>(&self, symbols: impl Iterator<Item = &'a Symbol>) -> Vec<u8> {
        let len = self.info.transfer_length() as usize;
        let mut payload = Vec::with_capacity(self.source_symbols() * self.symbol_size());
        for s in symbols {
            payload.extend_from_slice(s.as_bytes());
        }
        payload.truncate(len);
        payload
    }

    fn finish(&mut self, payload: Vec<u8>) -> DecodeStatus {
        info!(
            "decoded {} bytes from {} symbols (K={})",
            payload.len(),
            self.rows.len(),
            self.source_symbols()
        );
        telemetry::DECODE_SUCCESS.inc();
        self.payload = Some(payload);
        self.state = DecoderState::Decoded;
        DecodeStatus::Done
    }

    /// Copies piece `index` of `buf.len()` bytes out of the decoded payload.
    ///
    /// Returns `false` until the block is decoded or when the piece runs past
    /// the end of the payload.
    pub fn retrieve_piece(&self, index: usize, buf: &mut [u8]) -> bool {
        let Some(payload) = &self.payload else {
            return false;
        };
        let Some(start) = index.checked_mul(buf.len()) else {
            return false;
        };
        match start.checked_add(buf.len()) {
            Some(end) if end <= payload.len() => {
                buf.copy_from_slice(&payload[start..end]);
                true
            }
            _ => false,
        }
    }
}

/// Decoder shared between threads; calls are serialised by a mutex so at
/// most one elimination runs at a time.
#[derive(Clone, Debug)]
pub struct SharedDecoder {
    inner: Arc<Mutex<Decoder>>,
}

impl SharedDecoder {
    pub fn new(decoder: Decoder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(decoder)),
        }
    }

    pub fn decode(&self, packet: EncodingPacket) -> Result<Option<Vec<u8>>> {
        let mut guard = self.inner.lock().map_err(|_| FountainError::LockPoisoned)?;
        guard.decode(packet)
    }

    pub fn state(&self) -> Result<DecoderState> {
        let guard = self.inner.lock().map_err(|_| FountainError::LockPoisoned)?;
        Ok(guard.state())
    }

    pub fn payload(&self) -> Result<Option<Vec<u8>>> {
        let guard = self.inner.lock().map_err(|_| FountainError::LockPoisoned)?;
        Ok(guard.payload().map(<[u8]>::to_vec))
    }
}
