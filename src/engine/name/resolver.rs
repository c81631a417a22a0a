//! Strategy binding and name resolution

use super::buffer::NameBuffer;
use super::callable::{BoundCallable, CallingConvention, NameArg, NameCallInvoker, NativeInvoker};
use super::table::NameTable;
use super::{BindState, ExplicitOverride, InitPath, NameHandle, NameInit, NameStrategyKind, ResolvedName};
use crate::engine::config::{EngineVariantConfig, FNameLayout};
use crate::managers::CollisionTracker;
use crate::offset_finder::NameFunctionScanner;
use crate::platform::{MemoryReader, Platform};
use crate::utils::align;
use crate::{Error, Result};
use std::cell::RefCell;
use std::fmt;
use widestring::U16String;

/// Reserved capacity of the per-thread AppendString buffer
const NAME_SCRATCH_CAPACITY: usize = 1024;

/// Bytes scanned after a conversion thunk for the forwarded call
const THUNK_SCAN_WINDOW: usize = 0x40;

const CALL_REL32: u8 = 0xE8;

thread_local! {
    static SCRATCH: RefCell<NameBuffer> = RefCell::new(NameBuffer::with_capacity(NAME_SCRATCH_CAPACITY));
}

/// The strategy a resolver resolves through
#[derive(Debug, Clone, Copy)]
enum BoundStrategy {
    AppendString(BoundCallable),
    ToString(BoundCallable),
    NameTable(NameTable),
}

impl BoundStrategy {
    fn kind(&self) -> NameStrategyKind {
        match self {
            Self::AppendString(_) => NameStrategyKind::AppendString,
            Self::ToString(_) => NameStrategyKind::ToString,
            Self::NameTable(_) => NameStrategyKind::NameTable,
        }
    }

    fn address(&self) -> usize {
        match self {
            Self::AppendString(callable) | Self::ToString(callable) => callable.address,
            Self::NameTable(table) => table.address(),
        }
    }
}

/// One binding attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindAttempt {
    /// Which path was tried
    pub path: InitPath,
    /// Strategy and address on success, the reason otherwise
    pub outcome: std::result::Result<(NameStrategyKind, usize), String>,
}

/// A resolver that has not been bound to a strategy yet
pub struct UnboundResolver<'p, P: Platform> {
    platform: &'p P,
    config: EngineVariantConfig,
    invoker: Box<dyn NameCallInvoker + 'p>,
    diagnostics: Vec<BindAttempt>,
    failures_reported: usize,
}

/// A failed bind: the resolver is handed back unbound together with the error
pub struct BindFailure<'p, P: Platform> {
    /// The still-unbound resolver
    pub resolver: UnboundResolver<'p, P>,
    /// What went wrong on the last path tried
    pub error: Error,
}

impl<P: Platform> fmt::Debug for BindFailure<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindFailure")
            .field("error", &self.error)
            .field("attempts", &self.resolver.diagnostics)
            .finish()
    }
}

impl<P: Platform> fmt::Display for BindFailure<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

type BindResult<'p, P> = std::result::Result<NameResolver<'p, P>, BindFailure<'p, P>>;

impl<'p, P: Platform> UnboundResolver<'p, P> {
    /// Create a resolver that calls name functions in-process
    pub fn new(platform: &'p P, config: EngineVariantConfig) -> Self {
        Self::with_invoker(platform, config, Box::new(NativeInvoker))
    }

    /// Create a resolver with a custom invoker
    pub fn with_invoker(platform: &'p P, config: EngineVariantConfig, invoker: Box<dyn NameCallInvoker + 'p>) -> Self {
        Self {
            platform,
            config,
            invoker,
            diagnostics: Vec::new(),
            failures_reported: 0,
        }
    }

    /// Always [`BindState::Unbound`]
    pub fn state(&self) -> BindState {
        BindState::Unbound
    }

    /// The build configuration
    pub fn config(&self) -> &EngineVariantConfig {
        &self.config
    }

    /// Every binding attempt so far
    pub fn diagnostics(&self) -> &[BindAttempt] {
        &self.diagnostics
    }

    /// How many failed binds were reported
    pub fn failures_reported(&self) -> usize {
        self.failures_reported
    }

    /// Bind from an operator-supplied override
    pub fn bind_explicit(mut self, explicit: &ExplicitOverride) -> BindResult<'p, P> {
        let outcome = self.explicit_strategy(explicit);

        match self.record(InitPath::ExplicitOverride, outcome) {
            Ok(strategy) => {
                self.config.use_name_pool = explicit.is_name_pool;
                Ok(self.into_bound(strategy, BindState::BoundExplicit))
            }
            Err(error) => Err(self.fail(InitPath::ExplicitOverride, error)),
        }
    }

    /// Bind from the scanner's candidates.
    ///
    /// AppendString is preferred over ToString; with `force_name_table`
    /// only the name table is considered.
    pub fn auto_detect(mut self, scanner: &dyn NameFunctionScanner, force_name_table: bool) -> BindResult<'p, P> {
        let outcome = self.detected_strategy(scanner, force_name_table);

        match self.record(InitPath::AutoDetect, outcome) {
            Ok(strategy) => Ok(self.into_bound(strategy, BindState::BoundAutoDetected)),
            Err(error) => Err(self.fail(InitPath::AutoDetect, error)),
        }
    }

    /// Bind AppendString through the call inside a known conversion thunk
    pub fn bind_fallback(mut self, scanner: &dyn NameFunctionScanner) -> BindResult<'p, P> {
        let outcome = self.fallback_strategy(scanner);

        match self.record(InitPath::Fallback, outcome) {
            Ok(strategy) => Ok(self.into_bound(strategy, BindState::BoundFallback)),
            Err(error) => Err(self.fail(InitPath::Fallback, error)),
        }
    }

    /// Try explicit override, then auto-detection, then the fallback.
    ///
    /// An explicit override is authoritative: if it is present and invalid,
    /// no heuristic runs. A failure is reported once, naming the last path.
    pub fn initialize(mut self, init: &NameInit, scanner: &dyn NameFunctionScanner) -> BindResult<'p, P> {
        if let Some(explicit) = &init.explicit {
            return self.bind_explicit(explicit);
        }

        let detected = self.detected_strategy(scanner, init.force_name_table);
        let error = match self.record(InitPath::AutoDetect, detected) {
            Ok(strategy) => return Ok(self.into_bound(strategy, BindState::BoundAutoDetected)),
            Err(error) => error,
        };

        if !init.allow_fallback {
            return Err(self.fail(InitPath::AutoDetect, error));
        }

        let fallback = self.fallback_strategy(scanner);
        match self.record(InitPath::Fallback, fallback) {
            Ok(strategy) => Ok(self.into_bound(strategy, BindState::BoundFallback)),
            Err(error) => Err(self.fail(InitPath::Fallback, error)),
        }
    }

    fn explicit_strategy(&self, explicit: &ExplicitOverride) -> Result<BoundStrategy> {
        let module = match &explicit.module {
            Some(name) => self.platform.get_module(name)?,
            None => self.platform.get_main_module()?,
        };

        let address = module
            .base_address
            .checked_add(explicit.offset)
            .ok_or_else(|| Error::InvalidOffset {
                name: explicit.kind.to_string(),
                offset: explicit.offset,
                validation_error: format!("overflows from module base 0x{:X}", module.base_address),
            })?;

        if !module.contains(address) {
            return Err(Error::InvalidOffset {
                name: explicit.kind.to_string(),
                offset: explicit.offset,
                validation_error: format!("outside {} (0x{:X} bytes)", module.name, module.size),
            });
        }

        match explicit.kind {
            NameStrategyKind::NameTable => {
                let config = EngineVariantConfig {
                    use_name_pool: explicit.is_name_pool,
                    ..self.config
                };
                self.table_strategy(address, &config)
            }
            NameStrategyKind::AppendString => {
                self.callable_strategy(NameStrategyKind::AppendString, address, explicit.convention)
            }
            NameStrategyKind::ToString => {
                self.callable_strategy(NameStrategyKind::ToString, address, explicit.convention)
            }
        }
    }

    fn detected_strategy(&self, scanner: &dyn NameFunctionScanner, force_name_table: bool) -> Result<BoundStrategy> {
        if force_name_table {
            let address = scanner.find_name_table().ok_or_else(|| Error::OffsetNotFound {
                name: "name table".to_string(),
                reason: "no signature matched".to_string(),
            })?;
            return self.table_strategy(address, &self.config);
        }

        let candidates = [
            (NameStrategyKind::AppendString, scanner.find_append_string()),
            (NameStrategyKind::ToString, scanner.find_to_string()),
        ];

        let mut rejected = Vec::new();
        for (kind, candidate) in candidates {
            let Some(address) = candidate else { continue };

            match self.callable_strategy(kind, address, CallingConvention::default()) {
                Ok(strategy) => return Ok(strategy),
                Err(error) => {
                    tracing::debug!(%kind, address = format_args!("0x{address:X}"), %error, "rejecting candidate");
                    rejected.push(error.to_string());
                }
            }
        }

        Err(Error::OffsetNotFound {
            name: "AppendString/ToString".to_string(),
            reason: if rejected.is_empty() {
                "no signature matched".to_string()
            } else {
                rejected.join("; ")
            },
        })
    }

    fn fallback_strategy(&self, scanner: &dyn NameFunctionScanner) -> Result<BoundStrategy> {
        let thunk = scanner.find_conversion_thunk().ok_or_else(|| Error::OffsetNotFound {
            name: "name conversion thunk".to_string(),
            reason: "no signature matched".to_string(),
        })?;

        let code = self.platform.read_bytes(thunk, THUNK_SCAN_WINDOW)?;

        let target = code
            .windows(5)
            .enumerate()
            .filter(|(_, window)| window[0] == CALL_REL32)
            .find_map(|(offset, window)| {
                let rel = i32::from_le_bytes([window[1], window[2], window[3], window[4]]);
                let target = (thunk + offset + 5).checked_add_signed(rel as isize)?;
                self.platform.is_executable_address(target).then_some(target)
            })
            .ok_or_else(|| Error::OffsetNotFound {
                name: "AppendString".to_string(),
                reason: format!("no call into executable memory within 0x{THUNK_SCAN_WINDOW:X} bytes of 0x{thunk:X}"),
            })?;

        self.callable_strategy(NameStrategyKind::AppendString, target, CallingConvention::default())
    }

    fn callable_strategy(
        &self,
        kind: NameStrategyKind,
        address: usize,
        convention: CallingConvention,
    ) -> Result<BoundStrategy> {
        if !self.platform.is_executable_address(address) {
            return Err(Error::InvalidOffset {
                name: kind.to_string(),
                offset: address,
                validation_error: "not inside executable memory".to_string(),
            });
        }

        let callable = BoundCallable { address, convention };
        Ok(match kind {
            NameStrategyKind::ToString => BoundStrategy::ToString(callable),
            _ => BoundStrategy::AppendString(callable),
        })
    }

    fn table_strategy(&self, address: usize, config: &EngineVariantConfig) -> Result<BoundStrategy> {
        if !self.platform.is_valid_address(address) {
            return Err(Error::InvalidOffset {
                name: NameStrategyKind::NameTable.to_string(),
                offset: address,
                validation_error: "not readable".to_string(),
            });
        }

        Ok(BoundStrategy::NameTable(NameTable::from_config(address, config)))
    }

    fn record(&mut self, path: InitPath, outcome: Result<BoundStrategy>) -> Result<BoundStrategy> {
        self.diagnostics.push(BindAttempt {
            path,
            outcome: match &outcome {
                Ok(strategy) => Ok((strategy.kind(), strategy.address())),
                Err(error) => Err(error.to_string()),
            },
        });
        outcome
    }

    fn fail(mut self, path: InitPath, error: Error) -> BindFailure<'p, P> {
        let error = Error::Bind {
            path,
            source: Box::new(error),
        };

        tracing::error!(%error, attempts = self.diagnostics.len(), "FName resolution is unavailable");
        self.failures_reported += 1;

        BindFailure { resolver: self, error }
    }

    fn into_bound(self, strategy: BoundStrategy, state: BindState) -> NameResolver<'p, P> {
        let kind = strategy.kind();
        let address = format!("0x{:X}", strategy.address());

        match state {
            BindState::BoundFallback => tracing::warn!(
                %kind,
                %address,
                "bound name function through the conversion-thunk heuristic; verify the address"
            ),
            _ => tracing::info!(%kind, %address, ?state, "bound FName resolution"),
        }

        NameResolver {
            platform: self.platform,
            layout: self.config.fname_layout(),
            config: self.config,
            invoker: self.invoker,
            strategy,
            state,
            diagnostics: self.diagnostics,
            collisions: None,
        }
    }
}

/// A bound resolver; safe to share between threads
pub struct NameResolver<'p, P: Platform> {
    platform: &'p P,
    config: EngineVariantConfig,
    layout: FNameLayout,
    invoker: Box<dyn NameCallInvoker + 'p>,
    strategy: BoundStrategy,
    state: BindState,
    diagnostics: Vec<BindAttempt>,
    collisions: Option<&'p CollisionTracker>,
}

impl<P: Platform> fmt::Debug for NameResolver<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameResolver")
            .field("strategy", &self.strategy)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'p, P: Platform> NameResolver<'p, P> {
    /// How the resolver was bound
    pub fn state(&self) -> BindState {
        self.state
    }

    /// Strategy in use
    pub fn strategy(&self) -> NameStrategyKind {
        self.strategy.kind()
    }

    /// Address of the bound function or table
    pub fn bound_address(&self) -> usize {
        self.strategy.address()
    }

    /// The build configuration the resolver was bound with
    pub fn config(&self) -> &EngineVariantConfig {
        &self.config
    }

    /// Binding attempts that led here
    pub fn diagnostics(&self) -> &[BindAttempt] {
        &self.diagnostics
    }

    /// Register every resolved name with `tracker`.
    ///
    /// Collisions are logged by the tracker; resolution output is unchanged.
    pub fn with_collision_tracker(mut self, tracker: &'p CollisionTracker) -> Self {
        self.collisions = Some(tracker);
        self
    }

    /// Resolve `handle` into its three string forms.
    ///
    /// Null, unreadable and unknown handles give [`ResolvedName::empty`].
    /// Without an attached tracker, valid-name collisions are only detected
    /// if the caller registers the names itself.
    pub fn resolve(&self, handle: NameHandle) -> ResolvedName {
        let name = self
            .resolve_wide(handle)
            .map(ResolvedName::from_wide)
            .unwrap_or_else(ResolvedName::empty);

        if let Some(tracker) = self.collisions {
            // the tracker logs the clash
            let _ = tracker.register_name(&name);
        }

        name
    }

    /// Raw form as UTF-16
    pub fn to_raw_wstring(&self, handle: NameHandle) -> U16String {
        self.resolve(handle).raw
    }

    /// Raw form as UTF-8
    pub fn to_raw_string(&self, handle: NameHandle) -> String {
        self.resolve(handle).raw_string()
    }

    /// Display form as UTF-16
    pub fn to_wstring(&self, handle: NameHandle) -> U16String {
        self.resolve(handle).display_wide()
    }

    /// Display form as UTF-8
    pub fn to_string(&self, handle: NameHandle) -> String {
        self.resolve(handle).display
    }

    /// Display form sanitised into an identifier; never empty
    pub fn to_valid_string(&self, handle: NameHandle) -> String {
        self.resolve(handle).valid
    }

    /// `ComparisonIndex` of the handle, if it can be read
    pub fn comparison_index(&self, handle: NameHandle) -> Option<u32> {
        self.read_handle(handle).map(|(index, _)| index)
    }

    /// `Number` of the handle.
    ///
    /// Outline-number builds report 0; their suffix is part of the entry.
    pub fn get_number(&self, handle: NameHandle) -> u32 {
        self.read_handle(handle).map_or(0, |(_, number)| number)
    }

    /// Identity comparison by comparison index and number
    pub fn names_equal(&self, a: NameHandle, b: NameHandle) -> bool {
        match (self.read_handle(a), self.read_handle(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Display form of a bare comparison index
    pub fn comp_idx_to_string(&self, comparison_index: u32) -> String {
        self.to_string(NameHandle::index(comparison_index))
    }

    fn resolve_wide(&self, handle: NameHandle) -> Option<Vec<u16>> {
        if let NameHandle::Address(address) = handle {
            if address == 0 || !self.platform.is_valid_address(address) {
                return None;
            }
        }

        match &self.strategy {
            BoundStrategy::NameTable(table) => {
                let (index, number) = self.read_handle(handle)?;
                table.read_name(self.platform, &self.config, index, number)
            }
            BoundStrategy::AppendString(callable) => {
                let image = self.name_image(handle);
                let name = self.name_arg(handle, &image);

                SCRATCH.with(|scratch| match scratch.try_borrow_mut() {
                    Ok(mut buffer) => self.append_into(&mut buffer, *callable, name),
                    Err(_) => self.append_into(&mut NameBuffer::with_capacity(NAME_SCRATCH_CAPACITY), *callable, name),
                })
            }
            BoundStrategy::ToString(callable) => {
                let image = self.name_image(handle);
                let name = self.name_arg(handle, &image);

                match self.invoker.to_string(*callable, name) {
                    Ok(buffer) => Some(buffer.as_wide().to_vec()),
                    Err(error) => {
                        tracing::debug!(?handle, %error, "ToString call failed");
                        None
                    }
                }
            }
        }
    }

    fn append_into(&self, buffer: &mut NameBuffer, callable: BoundCallable, name: NameArg<'_>) -> Option<Vec<u16>> {
        if buffer.is_detached() || !buffer.is_usable() {
            *buffer = NameBuffer::with_capacity(NAME_SCRATCH_CAPACITY);
        }
        buffer.reset_len();

        match self.invoker.append_string(callable, name, buffer) {
            Ok(()) => Some(buffer.as_wide().to_vec()),
            Err(error) => {
                tracing::debug!(%error, "AppendString call failed");
                None
            }
        }
    }

    fn name_arg<'a>(&self, handle: NameHandle, image: &'a [u8]) -> NameArg<'a> {
        match handle {
            NameHandle::Address(address) => NameArg::Address(address),
            NameHandle::Index { .. } => NameArg::Image(image),
        }
    }

    /// Local `FName` for index handles; empty for address handles
    fn name_image(&self, handle: NameHandle) -> Vec<u8> {
        let NameHandle::Index { comparison_index, number } = handle else {
            return Vec::new();
        };

        let mut image = vec![0u8; align(self.layout.size, 8)];
        let mut put = |offset: usize, value: u32| {
            image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        };

        put(self.layout.comparison_index_offset, comparison_index);
        if let Some(offset) = self.layout.display_index_offset {
            put(offset, comparison_index);
        }
        if let Some(offset) = self.layout.number_offset {
            put(offset, number.unwrap_or(0));
        }

        image
    }

    /// `(ComparisonIndex, Number)` of a handle
    fn read_handle(&self, handle: NameHandle) -> Option<(u32, u32)> {
        match handle {
            NameHandle::Index { comparison_index, number } => {
                let number = if self.layout.number_offset.is_some() {
                    number.unwrap_or(0)
                } else {
                    0
                };
                Some((comparison_index, number))
            }
            NameHandle::Address(0) => None,
            NameHandle::Address(address) => {
                let index: u32 = self.platform.read(address + self.layout.comparison_index_offset).ok()?;
                let number = match self.layout.number_offset {
                    Some(offset) => self.platform.read::<u32>(address + offset).ok()?,
                    None => 0,
                };
                Some((index, number))
            }
        }
    }
}
