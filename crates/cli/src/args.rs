//! Command-line arguments

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};
use receipt_ids::{parse_when, SbpParams, DEFAULT_PP};
use std::path::PathBuf;
use template::ReceiptFields;

#[derive(Parser, Debug)]
#[command(name = "receipt-gen")]
#[command(version, about = "Generate payment receipt PDFs from a template")]
pub struct Cli {
    /// Template PDF
    #[arg(long, global = true, env = "PDF_TEMPLATE", default_value = "pdf 16.pdf")]
    pub template: PathBuf,

    /// PDF whose fonts supply glyph codes missing from the template (skipped if absent)
    #[arg(long, global = true, env = "CHARMAP_PDF", default_value = "pdf.pdf")]
    pub charmap: PathBuf,

    /// JSON layout description; the bank receipt layout when omitted
    #[arg(long, global = true)]
    pub layout: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a receipt with explicit identifiers
    Manual(ManualArgs),

    /// Generate a receipt with identifiers derived from a timestamp
    Auto(AutoArgs),

    /// Print an SBP transfer identifier
    Sbp(SbpArgs),

    /// Print a bank operation number
    Opn(OpnArgs),

    /// Print the text shown by a receipt
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
pub struct ManualArgs {
    /// Transfer date as printed, e.g. "18.08.2025 17:34:11 мск"
    pub date_time: String,

    /// Operation number
    pub operation: String,

    /// SBP identifier
    pub sbp_id: String,

    /// Document identifier (32 hex digits)
    pub file_id: String,

    /// Output PDF path
    pub output: PathBuf,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Args, Debug)]
pub struct AutoArgs {
    /// Transfer time (ISO-8601; Moscow time when no offset is given)
    #[arg(value_parser = parse_when_arg)]
    pub when: DateTime<FixedOffset>,

    /// Output PDF path
    pub output: PathBuf,

    /// Document identifier (32 hex digits); random when omitted
    #[arg(long)]
    pub file_id: Option<String>,

    #[command(flatten)]
    pub sbp: SbpParamArgs,

    /// Branch code of the operation number
    #[arg(long, default_value = DEFAULT_PP)]
    pub pp: String,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Args, Debug)]
pub struct SbpArgs {
    /// Transfer time (ISO-8601)
    #[arg(long, value_parser = parse_when_arg)]
    pub when: DateTime<FixedOffset>,

    #[command(flatten)]
    pub params: SbpParamArgs,
}

#[derive(Args, Debug)]
pub struct OpnArgs {
    /// Transfer time (ISO-8601)
    #[arg(long, value_parser = parse_when_arg)]
    pub when: DateTime<FixedOffset>,

    /// Branch code
    #[arg(long, default_value = DEFAULT_PP)]
    pub pp: String,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Receipt PDF to read
    pub pdf: PathBuf,
}

/// Fixed parts of the SBP identifier
#[derive(Args, Debug, Clone, Default)]
pub struct SbpParamArgs {
    #[arg(long)]
    pub prefix: Option<String>,
    #[arg(long)]
    pub node: Option<String>,
    #[arg(long)]
    pub route: Option<String>,
    #[arg(long)]
    pub code4: Option<String>,
    #[arg(long)]
    pub tail7: Option<String>,
}

impl From<SbpParamArgs> for SbpParams {
    fn from(args: SbpParamArgs) -> Self {
        let defaults = SbpParams::default();
        Self {
            prefix: args.prefix.unwrap_or(defaults.prefix),
            node: args.node.unwrap_or(defaults.node),
            route: args.route.unwrap_or(defaults.route),
            code4: args.code4.unwrap_or(defaults.code4),
            tail7: args.tail7.unwrap_or(defaults.tail7),
        }
    }
}

/// Operator-editable receipt fields; unset flags keep the stock values
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub form_date: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub commission: Option<String>,
    #[arg(long)]
    pub recipient: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub bank: Option<String>,
    #[arg(long)]
    pub account: Option<String>,
    #[arg(long)]
    pub message: Option<String>,
}

impl From<FieldArgs> for ReceiptFields {
    fn from(args: FieldArgs) -> Self {
        let defaults = ReceiptFields::default();
        Self {
            form_date: args.form_date.unwrap_or(defaults.form_date),
            amount: args.amount.unwrap_or(defaults.amount),
            commission: args.commission.unwrap_or(defaults.commission),
            recipient: args.recipient.unwrap_or(defaults.recipient),
            phone: args.phone.unwrap_or(defaults.phone),
            bank: args.bank.unwrap_or(defaults.bank),
            account: args.account.unwrap_or(defaults.account),
            message: args.message.unwrap_or(defaults.message),
        }
    }
}

fn parse_when_arg(value: &str) -> Result<DateTime<FixedOffset>, String> {
    parse_when(value).map_err(|e| e.to_string())
}
