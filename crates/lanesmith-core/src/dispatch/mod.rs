//! Descriptor tables and the one-time dispatcher.
//!
//! A [`DispatchTable`] lists the implementations of one kernel, most
//! specialized first, and always ends with the Default implementation whose
//! requirement is empty. Resolution scans the table against the detected
//! [`FeatureSet`], so it cannot fail.
//!
//! # Dispatch Strategy
//!
//! | Step | Rule |
//! |------|------|
//! | 1 | Walk the CPU's microarchitecture preference list; take the first entry with that tag whose requirement is satisfied |
//! | 2 | Otherwise take the first satisfied entry in declared order |
//! | 3 | The Default entry always satisfies step 2 |
//!
//! Each public kernel owns a `'static` [`Dispatcher`] that resolves once
//! (`OnceLock`) and then hands out the selected function pointer. Concurrent
//! first calls all observe the same selection.


use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpu::{self, CpuInfo, FeatureSet, Microarchitecture};
use crate::kernel_spec::KernelSpec;

/// Where an implementation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Generated or hand-scheduled for one microarchitecture.
    Asm,
    /// Capability-independent reference code.
    Portable,
}

impl Provenance {
    /// Short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asm => "asm",
            Self::Portable => "portable",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One implementation of a kernel.
#[derive(Debug, Clone, Copy)]
pub struct ImplementationDescriptor<F> {
    /// Routine entry point.
    pub function: F,
    /// Capabilities the routine needs.
    pub required: FeatureSet,
    /// Microarchitecture the routine was tuned for.
    pub microarch: Microarchitecture,
    /// Origin of the routine.
    pub provenance: Provenance,
    /// Short variant label (`"pipelined"`, `"avx2-fma-4acc"`, `"default"`).
    pub variant: &'static str,
}

impl<F: Copy> ImplementationDescriptor<F> {
    /// Describes a microarchitecture-specific routine.
    #[must_use]
    pub const fn specialized(
        function: F,
        required: FeatureSet,
        microarch: Microarchitecture,
        variant: &'static str,
    ) -> Self {
        Self {
            function,
            required,
            microarch,
            provenance: Provenance::Asm,
            variant,
        }
    }

    /// Describes the Default routine.
    #[must_use]
    pub const fn default_entry(function: F) -> Self {
        Self {
            function,
            required: FeatureSet::EMPTY,
            microarch: Microarchitecture::Unknown,
            provenance: Provenance::Portable,
            variant: "default",
        }
    }

    /// Serializable view without the function pointer.
    #[must_use]
    pub fn info(&self, index: usize) -> DescriptorInfo {
        DescriptorInfo {
            index,
            microarch: self.microarch,
            provenance: self.provenance,
            variant: self.variant,
            required: self.required,
        }
    }
}

/// Function-free description of a table entry, for reports and manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DescriptorInfo {
    /// Position in the table.
    pub index: usize,
    /// Microarchitecture tag.
    pub microarch: Microarchitecture,
    /// Origin.
    pub provenance: Provenance,
    /// Variant label.
    pub variant: &'static str,
    /// Required capabilities.
    pub required: FeatureSet,
}

/// Structural defect of a descriptor table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A specialized entry has an empty requirement, shadowing the Default.
    #[error("entry {index} ({microarch}) has an empty requirement but is not the Default")]
    EmptyRequirement {
        /// Entry position.
        index: usize,
        /// Its tag.
        microarch: Microarchitecture,
    },

    /// The Default entry requires something.
    #[error("the Default entry requires {0}")]
    DefaultNotEmpty(FeatureSet),
}

/// Ordered implementations of one kernel, ending with the Default.
#[derive(Debug, Clone)]
pub struct DispatchTable<F> {
    specialized: Vec<ImplementationDescriptor<F>>,
    default: ImplementationDescriptor<F>,
}

impl<F: Copy> DispatchTable<F> {
    /// Builds a table from specialized entries, most specialized first, and
    /// appends `default` as the last entry.
    #[must_use]
    pub fn new(specialized: Vec<ImplementationDescriptor<F>>, default: F) -> Self {
        Self {
            specialized,
            default: ImplementationDescriptor::default_entry(default),
        }
    }

    /// Number of entries including the Default.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specialized.len() + 1
    }

    /// Always false: a table holds at least the Default.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Entries in declared order, the Default last.
    pub fn entries(&self) -> impl Iterator<Item = &ImplementationDescriptor<F>> + '_ {
        self.specialized.iter().chain(std::iter::once(&self.default))
    }

    /// The Default entry.
    #[must_use]
    pub fn default_entry(&self) -> &ImplementationDescriptor<F> {
        &self.default
    }

    /// Checks that exactly one entry, the last, has an empty requirement.
    pub fn validate(&self) -> Result<(), TableError> {
        if let Some((index, entry)) = self
            .specialized
            .iter()
            .enumerate()
            .find(|(_, e)| e.required.is_empty())
        {
            return Err(TableError::EmptyRequirement {
                index,
                microarch: entry.microarch,
            });
        }
        if !self.default.required.is_empty() {
            return Err(TableError::DefaultNotEmpty(self.default.required));
        }
        Ok(())
    }

    /// First entry in declared order whose requirement `detected` satisfies.
    #[must_use]
    pub fn resolve(&self, detected: FeatureSet) -> (usize, &ImplementationDescriptor<F>) {
        self.specialized
            .iter()
            .enumerate()
            .find(|(_, e)| e.required.is_satisfied_by(detected))
            .unwrap_or((self.specialized.len(), &self.default))
    }

    /// Resolution honoring the CPU's microarchitecture preference list.
    ///
    /// Unknown microarchitectures resolve by declared order.
    #[must_use]
    pub fn resolve_with_preference(&self, cpu: &CpuInfo) -> (usize, &ImplementationDescriptor<F>) {
        if cpu.microarchitecture != Microarchitecture::Unknown {
            for &tag in cpu.microarchitecture.dispatch_preference() {
                if tag == Microarchitecture::Unknown {
                    break;
                }
                let found = self
                    .specialized
                    .iter()
                    .enumerate()
                    .find(|(_, e)| e.microarch == tag && e.required.is_satisfied_by(cpu.features));
                if let Some(found) = found {
                    return found;
                }
            }
        }
        self.resolve(cpu.features)
    }

    /// Function-free views of every entry.
    #[must_use]
    pub fn infos(&self) -> Vec<DescriptorInfo> {
        self.entries().enumerate().map(|(i, e)| e.info(i)).collect()
    }
}

/// Table resolution against a bare feature set.
#[must_use]
pub fn resolve<F: Copy>(table: &DispatchTable<F>, detected: FeatureSet) -> F {
    table.resolve(detected).1.function
}

/// Table resolution against a full CPU description.
#[must_use]
pub fn resolve_with_preference<F: Copy>(table: &DispatchTable<F>, cpu: &CpuInfo) -> F {
    table.resolve_with_preference(cpu).1.function
}

#[derive(Debug, Clone, Copy)]
struct Selection<F> {
    function: F,
    index: usize,
}

/// One-time memoized resolver for one kernel.
///
/// The table is built on first use; the selected routine is resolved
/// against [`cpu::probe`] once and published through a `OnceLock`.
pub struct Dispatcher<F: 'static> {
    spec: &'static KernelSpec,
    build: fn() -> DispatchTable<F>,
    table: OnceLock<DispatchTable<F>>,
    selected: OnceLock<Selection<F>>,
}

impl<F: Copy + 'static> Dispatcher<F> {
    /// Creates an unresolved dispatcher.
    #[must_use]
    pub const fn new(spec: &'static KernelSpec, build: fn() -> DispatchTable<F>) -> Self {
        Self {
            spec,
            build,
            table: OnceLock::new(),
            selected: OnceLock::new(),
        }
    }

    /// Kernel the dispatcher serves.
    #[must_use]
    pub fn spec(&self) -> &'static KernelSpec {
        self.spec
    }

    /// The kernel's descriptor table.
    pub fn table(&self) -> &DispatchTable<F> {
        self.table.get_or_init(self.build)
    }

    fn selection(&self) -> Selection<F> {
        *self.selected.get_or_init(|| {
            let cpu = cpu::probe();
            let (index, entry) = self.table().resolve_with_preference(cpu);
            tracing::debug!(
                kernel = %self.spec.identity(),
                microarch = %entry.microarch,
                variant = entry.variant,
                index,
                "resolved implementation"
            );
            Selection {
                function: entry.function,
                index,
            }
        })
    }

    /// The selected routine, resolving on first call.
    #[inline]
    pub fn get(&self) -> F {
        self.selection().function
    }

    /// Position of the selected routine in the table.
    pub fn selected_index(&self) -> usize {
        self.selection().index
    }
}

/// Type-erased view of a kernel's dispatcher, for catalogues.
pub trait KernelEntry: Sync {
    /// The kernel's static description.
    fn spec(&self) -> &'static KernelSpec;

    /// Every implementation in declared order.
    fn implementations(&self) -> Vec<DescriptorInfo>;

    /// The implementation this process uses, resolving if needed.
    fn selected(&self) -> DescriptorInfo;

    /// The implementation a given CPU would use.
    fn resolve_for(&self, cpu: &CpuInfo) -> DescriptorInfo;

    /// Checks the table structure.
    fn validate(&self) -> Result<(), TableError>;
}

impl<F: Copy + Send + Sync + 'static> KernelEntry for Dispatcher<F> {
    fn spec(&self) -> &'static KernelSpec {
        self.spec
    }

    fn implementations(&self) -> Vec<DescriptorInfo> {
        self.table().infos()
    }

    fn selected(&self) -> DescriptorInfo {
        let index = self.selected_index();
        let table = self.table();
        table
            .entries()
            .nth(index)
            .unwrap_or(table.default_entry())
            .info(index)
    }

    fn resolve_for(&self, cpu: &CpuInfo) -> DescriptorInfo {
        let (index, entry) = self.table().resolve_with_preference(cpu);
        entry.info(index)
    }

    fn validate(&self) -> Result<(), TableError> {
        self.table().validate()
    }
}

/// Resolution of one kernel, as reported by `init`.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedKernel {
    /// `Area_Function_Signature`.
    pub identity: String,
    /// The selected entry.
    pub selected: DescriptorInfo,
    /// Entries in the table.
    pub candidates: usize,
}

/// Result of forcing every dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    /// The probed CPU.
    pub cpu: CpuInfo,
    /// One row per kernel.
    pub kernels: Vec<ResolvedKernel>,
}

impl InitReport {
    /// Kernels that run something other than the Default.
    #[must_use]
    pub fn specialized_count(&self) -> usize {
        self.kernels
            .iter()
            .filter(|k| k.selected.provenance != Provenance::Portable)
            .count()
    }
}

/// Resolves every kernel in `entries` and reports the selection.
///
/// Idempotent: later calls observe the selections of the first one.
pub fn init_entries(entries: &[&dyn KernelEntry]) -> InitReport {
    let cpu = *cpu::probe();
    let kernels = entries
        .iter()
        .map(|entry| ResolvedKernel {
            identity: entry.spec().identity(),
            selected: entry.selected(),
            candidates: entry.implementations().len(),
        })
        .collect::<Vec<_>>();
    tracing::info!(
        kernels = kernels.len(),
        microarch = %cpu.microarchitecture,
        "dispatch initialized"
    );
    InitReport { cpu, kernels }
}
