//! Subcommand handlers.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use lanesmith_core::codegen::{BackendKind, RoutineBody};
use lanesmith_core::cpu::{self, CpuInfo, Microarchitecture};
use lanesmith_core::dispatch::{DescriptorInfo, Provenance};
use lanesmith_core::schedule::TARGETS;
use lanesmith_core::{GeneratorConfig, Generator};
use serde_json::json;

fn provenance_cell(info: &DescriptorInfo) -> Cell {
    let cell = Cell::new(info.provenance.as_str());
    match info.provenance {
        Provenance::Asm => cell.fg(Color::Green),
        Provenance::Portable => cell.fg(Color::Yellow),
    }
}

fn requirement(info: &DescriptorInfo, cpu: &CpuInfo) -> String {
    let names = info.required.names(cpu.name_table());
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(" ")
    }
}

fn find_kernel(identity: &str) -> Result<&'static dyn lanesmith_core::KernelEntry> {
    lanesmith_core::find(identity).with_context(|| {
        format!("unknown kernel '{identity}' (run `lanesmith kernels` for the list)")
    })
}

pub fn cpu(json: bool) -> Result<()> {
    let info = cpu::probe();
    let features = info.features.names(info.name_table());
    if json {
        let value = json!({
            "vendor": format!("{:?}", info.vendor),
            "architecture": format!("{:?}", info.architecture),
            "microarchitecture": info.microarchitecture.name(),
            "features": features,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "CPU".bold());
    println!("  Vendor:            {:?}", info.vendor);
    println!("  Architecture:      {:?}", info.architecture);
    println!("  Microarchitecture: {}", info.microarchitecture.name().green());
    println!("  Dispatch order:    {}", preference(info.microarchitecture));
    if features.is_empty() {
        println!("  Features:          {}", "none detected".yellow());
    } else {
        println!("  Features:          {}", features.join(" "));
    }
    Ok(())
}

fn preference(microarch: Microarchitecture) -> String {
    microarch
        .dispatch_preference()
        .iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(" > ")
}

pub fn kernels(filter: Option<&str>, json: bool) -> Result<()> {
    let report = lanesmith_core::init();
    let needle = filter.map(str::to_ascii_lowercase);
    let rows: Vec<_> = report
        .kernels
        .iter()
        .filter(|k| {
            needle
                .as_deref()
                .map_or(true, |n| k.identity.to_ascii_lowercase().contains(n))
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No kernels match.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Kernel", "Selected", "Variant", "Origin", "Entries"]);
    for kernel in &rows {
        table.add_row(vec![
            Cell::new(&kernel.identity),
            Cell::new(kernel.selected.microarch.name()),
            Cell::new(kernel.selected.variant),
            provenance_cell(&kernel.selected),
            Cell::new(kernel.candidates),
        ]);
    }
    println!("{table}");
    println!(
        "{} of {} kernels specialized for {}",
        rows.iter()
            .filter(|k| k.selected.provenance == Provenance::Asm)
            .count()
            .to_string()
            .bold(),
        rows.len(),
        report.cpu.microarchitecture.name().green()
    );
    Ok(())
}

pub fn resolve(identity: &str, baseline: bool) -> Result<()> {
    let entry = find_kernel(identity)?;
    let cpu = if baseline { CpuInfo::baseline() } else { *cpu::probe() };
    let chosen = entry.resolve_for(&cpu);
    tracing::debug!(kernel = identity, index = chosen.index, baseline, "resolved");

    println!("{} {}", "Kernel:".bold(), entry.spec().identity().green());
    println!("  Parameters:");
    for param in entry.spec().parameters() {
        println!("    {}", serde_json::to_string(&param)?);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Microarch", "Variant", "Origin", "Requires", "Eligible"]);
    for info in entry.implementations() {
        let eligible = info.required.is_satisfied_by(cpu.features);
        let marker = if info.index == chosen.index { "selected" } else if eligible { "yes" } else { "no" };
        let marker = Cell::new(marker).fg(match marker {
            "selected" => Color::Green,
            "yes" => Color::White,
            _ => Color::DarkGrey,
        });
        table.add_row(vec![
            Cell::new(info.index),
            Cell::new(info.microarch.name()),
            Cell::new(info.variant),
            provenance_cell(&info),
            Cell::new(requirement(&info, &cpu)),
            marker,
        ]);
    }
    println!("{table}");
    if baseline {
        println!("Resolved for a baseline CPU (no optional capabilities).");
    } else {
        println!("Resolved for {}.", cpu.microarchitecture.name().green());
    }
    Ok(())
}

pub fn schedule(identity: &str, target: &str, backend: BackendKind) -> Result<()> {
    let entry = find_kernel(identity)?;
    let microarch = Microarchitecture::from_name(target)
        .filter(|m| TARGETS.contains(m))
        .with_context(|| {
            let known: Vec<&str> = TARGETS.iter().map(|m| m.name()).collect();
            format!("unknown target '{target}' (expected one of {})", known.join(", "))
        })?;
    let renderer = backend.instance();
    if !renderer.supports(microarch) {
        bail!("the {backend} backend does not emit code for {microarch}");
    }
    let body = RoutineBody::build(entry.spec(), microarch)?;
    print!("{}", renderer.render(&body));
    Ok(())
}

pub fn generate(config: GeneratorConfig) -> Result<()> {
    config.validate()?;
    tracing::debug!(
        targets = ?config.targets,
        backends = ?config.backends,
        "generating"
    );
    let generator = Generator::new(config);
    let report = generator.run()?;
    println!(
        "{} {} routines in {} listings under {}",
        "Generated".green().bold(),
        report.routines,
        report.listings.len(),
        generator.config().output_dir.display()
    );
    if let Some(manifest) = &report.manifest {
        println!("Manifest: {}", manifest.display());
    }
    if report.listings.is_empty() {
        println!("{}", "No selected backend supports the selected targets.".yellow());
    }
    Ok(())
}

pub fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let text = GeneratorConfig::default().to_toml()?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

pub fn config_show(config: &GeneratorConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
