//! Whole-catalog generation.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use super::{Backend, Listing, RoutineBody};
use crate::config::GeneratorConfig;
use crate::cpu::Microarchitecture;
use crate::dispatch::{DescriptorInfo, KernelEntry};
use crate::element::ElementType;
use crate::error::Result;
use crate::kernel_spec::Parameter;
use crate::kernels;
use crate::schedule::KernelShape;

/// Schedule summary of one kernel on one target.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestSchedule {
    /// Target.
    pub microarch: Microarchitecture,
    /// Plan row.
    pub shape: KernelShape,
    /// Computation type.
    pub element: ElementType,
    /// Registers per batch.
    pub unroll: usize,
    /// Lanes per register.
    pub lanes: usize,
    /// Register width in bytes.
    pub register_bytes: usize,
    /// Stage offset of every stream.
    pub offsets: Vec<usize>,
    /// Cycles of latency the offsets leave exposed.
    pub exposed_latency: u32,
}

/// One kernel in the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestKernel {
    /// `Area_Function_Signature`.
    pub identity: String,
    /// Prototype.
    pub parameters: Vec<Parameter>,
    /// Descriptor table, Default last.
    pub implementations: Vec<DescriptorInfo>,
    /// Per-target schedules.
    pub schedules: Vec<ManifestSchedule>,
}

/// `manifest.json` contents.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Crate version that produced the manifest.
    pub version: &'static str,
    /// Selected targets.
    pub targets: Vec<Microarchitecture>,
    /// Every kernel.
    pub kernels: Vec<ManifestKernel>,
}

/// What [`Generator::run`] wrote.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// Listing files.
    pub listings: Vec<PathBuf>,
    /// Routines across all listings.
    pub routines: usize,
    /// Manifest file, when enabled.
    pub manifest: Option<PathBuf>,
}

/// Renders the kernel catalog for the configured targets and backends.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Generator for a validated configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Bodies of every kernel on `microarch`, in catalog order.
    pub fn bodies(microarch: Microarchitecture) -> Result<Vec<RoutineBody>> {
        kernels::catalog()
            .into_iter()
            .map(|entry| RoutineBody::build(entry.spec(), microarch))
            .collect()
    }

    /// One listing per selected (backend, target) pair the backend supports.
    pub fn listings(&self) -> Result<Vec<Listing>> {
        let targets = self.config.microarchitectures()?;
        let mut listings = Vec::new();
        for kind in &self.config.backends {
            let backend = kind.instance();
            for &microarch in targets.iter().filter(|&&m| backend.supports(m)) {
                listings.push(render_listing(backend.as_ref(), microarch)?);
            }
        }
        Ok(listings)
    }

    /// Manifest for the selected targets.
    pub fn manifest(&self) -> Result<Manifest> {
        let targets = self.config.microarchitectures()?;
        let kernels = kernels::catalog()
            .into_iter()
            .map(|entry| manifest_kernel(entry, &targets))
            .collect::<Result<Vec<_>>>()?;
        Ok(Manifest {
            version: env!("CARGO_PKG_VERSION"),
            targets,
            kernels,
        })
    }

    /// Writes `<output>/<backend>/<target>.<ext>` for every listing and
    /// `<output>/manifest.json` when enabled.
    pub fn run(&self) -> Result<GenerationReport> {
        let root = &self.config.output_dir;
        let mut report = GenerationReport::default();

        for listing in self.listings()? {
            let dir = root.join(listing.backend.as_str());
            fs::create_dir_all(&dir)?;
            let path = dir.join(listing.file_name());
            fs::write(&path, &listing.text)?;
            tracing::info!(
                backend = %listing.backend,
                microarch = %listing.microarch,
                routines = listing.routines,
                path = %path.display(),
                "listing written"
            );
            report.routines += listing.routines;
            report.listings.push(path);
        }

        if self.config.manifest {
            fs::create_dir_all(root)?;
            let path = root.join("manifest.json");
            let json = serde_json::to_string_pretty(&self.manifest()?)?;
            fs::write(&path, json)?;
            tracing::info!(path = %path.display(), "manifest written");
            report.manifest = Some(path);
        }
        Ok(report)
    }
}

fn render_listing(backend: &dyn Backend, microarch: Microarchitecture) -> Result<Listing> {
    let bodies = Generator::bodies(microarch)?;
    let mut text = backend.preamble(microarch).join("\n");
    text.push('\n');
    for body in &bodies {
        text.push('\n');
        text.push_str(&backend.render(body));
    }
    Ok(Listing {
        backend: backend.kind(),
        microarch,
        routines: bodies.len(),
        text,
    })
}

fn manifest_kernel(entry: &dyn KernelEntry, targets: &[Microarchitecture]) -> Result<ManifestKernel> {
    let spec = entry.spec();
    let mut schedules = Vec::with_capacity(targets.len());
    for &microarch in targets {
        let body = RoutineBody::build(spec, microarch)?;
        let report = body.schedule.latency_report();
        if report.total_exposed() > 0 {
            tracing::debug!(
                kernel = %body.identity,
                microarch = %microarch,
                exposed = report.total_exposed(),
                "schedule leaves latency exposed"
            );
        }
        schedules.push(ManifestSchedule {
            microarch,
            shape: body.shape,
            element: body.element,
            unroll: body.schedule.unroll(),
            lanes: body.schedule.lanes(),
            register_bytes: body.schedule.register_bytes(),
            offsets: body.schedule.streams().iter().map(|s| s.offset).collect(),
            exposed_latency: report.total_exposed(),
        });
    }
    Ok(ManifestKernel {
        identity: spec.identity(),
        parameters: spec.parameters(),
        implementations: entry.implementations(),
        schedules,
    })
}
