//! Subcommand implementations

use crate::args::{AutoArgs, Cli, Command, ManualArgs};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use pdf_core::GlyphCodec;
use receipt_ids::{
    format_msk, generate_file_id, validate_op_number, validate_sbp_id, OperationNumberGenerator,
    SbpIdGenerator, SbpParams,
};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::Path;
use template::{
    extract_text, parse_layout, FieldValues, ReceiptFields, ReceiptTemplate, TemplateLayout,
};
use tracing::{debug, info, warn};

/// Identifiers used for an automatically numbered receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedIds {
    pub operation: String,
    pub sbp_id: String,
    pub file_id: String,
}

/// Execute a parsed command line, printing results to `out`
pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let layout = cli.layout.as_deref();

    match cli.command {
        Command::Manual(args) => {
            let template = load_template(&cli.template, &cli.charmap, load_layout(layout)?)?;
            manual(&template, args)?;
        }
        Command::Auto(args) => {
            let template = load_template(&cli.template, &cli.charmap, load_layout(layout)?)?;
            let output = args.output.clone();
            let ids = auto(&template, args)?;
            let summary = json!({
                "operation": ids.operation,
                "sbpId": ids.sbp_id,
                "fileId": ids.file_id,
                "output": output.display().to_string(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        }
        Command::Sbp(args) => {
            let mut generator = SbpIdGenerator::new(args.params.into());
            writeln!(out, "{}", generator.generate(&args.when))?;
        }
        Command::Opn(args) => {
            let mut generator = OperationNumberGenerator::new(args.pp);
            writeln!(out, "{}", generator.generate(&args.when))?;
        }
        Command::Extract(args) => {
            let layout = load_layout(layout)?;
            let data = fs::read(&args.pdf)
                .with_context(|| format!("failed to read {}", args.pdf.display()))?;
            for line in extract_text(data, &layout)? {
                writeln!(out, "{line}")?;
            }
        }
    }

    Ok(())
}

/// The layout from a JSON file, or the bank receipt layout
pub fn load_layout(path: Option<&Path>) -> Result<TemplateLayout> {
    let Some(path) = path else {
        return Ok(TemplateLayout::receipt());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    parse_layout(&json).with_context(|| format!("invalid layout {}", path.display()))
}

/// Load the template and merge glyph codes from `charmap` when it exists
pub fn load_template(
    template: &Path,
    charmap: &Path,
    layout: TemplateLayout,
) -> Result<ReceiptTemplate> {
    let loaded = ReceiptTemplate::open(template, layout)
        .with_context(|| format!("failed to load template {}", template.display()))?;

    if !charmap.exists() {
        debug!(path = %charmap.display(), "no secondary charmap");
        return Ok(loaded);
    }

    let data = fs::read(charmap)
        .with_context(|| format!("failed to read charmap {}", charmap.display()))?;
    let codec = GlyphCodec::from_pdf_fonts(&data)
        .with_context(|| format!("failed to read fonts of {}", charmap.display()))?;
    info!(path = %charmap.display(), chars = codec.len(), "loaded secondary charmap");
    Ok(loaded.with_fallback(&codec))
}

/// Generate a receipt from explicitly given identifiers
pub fn manual(template: &ReceiptTemplate, args: ManualArgs) -> Result<()> {
    if validate_op_number(&args.operation).is_err() {
        warn!(operation = %args.operation, "operation number has an unusual shape");
    }
    if validate_sbp_id(&args.sbp_id).is_err() {
        warn!(sbp_id = %args.sbp_id, "SBP identifier has an unusual shape");
    }

    let values = ReceiptFields::from(args.fields).into_values(
        args.date_time,
        args.operation,
        args.sbp_id,
    );
    write_receipt(template, &values, &args.file_id, &args.output)
}

/// Generate a receipt, deriving its identifiers from `args.when`
pub fn auto(template: &ReceiptTemplate, args: AutoArgs) -> Result<GeneratedIds> {
    let ids = generate_ids(&args.when, args.sbp.into(), &args.pp, args.file_id);

    let values = ReceiptFields::from(args.fields).into_values(
        format_msk(&args.when),
        ids.operation.clone(),
        ids.sbp_id.clone(),
    );
    write_receipt(template, &values, &ids.file_id, &args.output)?;
    Ok(ids)
}

/// Fresh identifiers for a single transfer made at `when`
pub fn generate_ids<Tz: TimeZone>(
    when: &DateTime<Tz>,
    params: SbpParams,
    pp: &str,
    file_id: Option<String>,
) -> GeneratedIds {
    GeneratedIds {
        operation: OperationNumberGenerator::new(pp).generate(when),
        sbp_id: SbpIdGenerator::new(params).generate(when),
        file_id: file_id.unwrap_or_else(generate_file_id),
    }
}

fn write_receipt(
    template: &ReceiptTemplate,
    values: &FieldValues,
    file_id: &str,
    output: &Path,
) -> Result<()> {
    let pdf = template
        .substitute(values, file_id)
        .context("failed to generate receipt")?;
    fs::write(output, &pdf).with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), bytes = pdf.len(), "receipt written");
    Ok(())
}
