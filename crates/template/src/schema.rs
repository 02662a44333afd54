//! Layout description and receipt field types

use pdf_core::ObjectLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to display value, as consumed by
/// [`ReceiptTemplate::substitute`](crate::ReceiptTemplate::substitute)
pub type FieldValues = BTreeMap<String, String>;

/// Field names of the bank receipt
pub mod fields {
    pub const FORM_DATE: &str = "form_date";
    pub const AMOUNT: &str = "amount";
    pub const COMMISSION: &str = "commission";
    pub const DATE: &str = "date";
    pub const OPERATION: &str = "operation";
    pub const RECIPIENT: &str = "recipient";
    pub const PHONE: &str = "phone";
    pub const BANK: &str = "bank";
    pub const ACCOUNT: &str = "account";
    pub const ID: &str = "id";
    pub const MESSAGE: &str = "message";
}

/// Static caption that precedes a field's value in the content stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldLabel {
    /// Caption text exactly as rendered (spaces, not NBSP)
    pub label: String,

    /// Field the following text segment belongs to
    pub field: String,
}

impl FieldLabel {
    pub fn new(label: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
        }
    }
}

/// Shape of a template document and the captions of its fields
///
/// Every key is optional in JSON; missing keys take the bank receipt
/// values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateLayout {
    /// Text written before the first object
    pub header: String,

    /// Number of xref entries, including the free entry 0
    pub size: usize,

    /// Object ids in file order
    pub order: Vec<u32>,

    /// Catalog object id
    pub root: u32,

    /// Document info object id
    pub info: u32,

    /// Object holding the page content stream
    pub content_object: u32,

    /// Object holding the font's ToUnicode CMap
    pub cmap_object: u32,

    /// Glyph code that ends a line inside a text segment
    pub line_feed_code: String,

    /// Captions in replacement priority order
    pub labels: Vec<FieldLabel>,
}

impl TemplateLayout {
    /// Layout of the bank transfer receipt
    pub fn receipt() -> Self {
        let objects = ObjectLayout::receipt();
        Self {
            header: String::from_utf8_lossy(&objects.header).into_owned(),
            size: objects.size,
            order: objects.order,
            root: objects.root,
            info: objects.info,
            content_object: 9,
            cmap_object: 14,
            line_feed_code: "000A".to_string(),
            labels: vec![
                FieldLabel::new("Сформирована", fields::FORM_DATE),
                FieldLabel::new("Сумма перевода", fields::AMOUNT),
                FieldLabel::new("Комиссия", fields::COMMISSION),
                FieldLabel::new("Дата и время перевода", fields::DATE),
                FieldLabel::new("Номер операции", fields::OPERATION),
                FieldLabel::new("Получатель", fields::RECIPIENT),
                FieldLabel::new("Номер телефона получателя", fields::PHONE),
                FieldLabel::new("Банк получателя", fields::BANK),
                FieldLabel::new("Счёт списания", fields::ACCOUNT),
                FieldLabel::new("Идентификатор операции в СБП", fields::ID),
                FieldLabel::new("Сообщение получателю", fields::MESSAGE),
            ],
        }
    }

    /// The structural part, as understood by `pdf-core`
    pub fn object_layout(&self) -> ObjectLayout {
        ObjectLayout {
            header: self.header.as_bytes().to_vec(),
            size: self.size,
            order: self.order.clone(),
            root: self.root,
            info: self.info,
        }
    }

    /// Distinct field names in label order
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            if !names.contains(&label.field.as_str()) {
                names.push(&label.field);
            }
        }
        names
    }
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self::receipt()
    }
}

/// Operator-editable values of a receipt
///
/// The per-transfer values (date, operation number, SBP id) are passed
/// separately to [`into_values`](Self::into_values).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReceiptFields {
    pub form_date: String,
    pub amount: String,
    pub commission: String,
    pub recipient: String,
    pub phone: String,
    pub bank: String,
    pub account: String,
    pub message: String,
}

impl Default for ReceiptFields {
    fn default() -> Self {
        Self {
            form_date: "22.08.2025 11:28 мск".to_string(),
            amount: "0,01 RUR".to_string(),
            commission: "0 RUR".to_string(),
            recipient: "Михаил Сергеевич К ".to_string(),
            phone: "7й526247787".to_string(),
            bank: "В-Банк".to_string(),
            account: "408178100088600й7530".to_string(),
            message: "Перевод денеАнЕГ средств".to_string(),
        }
    }
}

impl ReceiptFields {
    /// Combine with the per-transfer values into a full field map
    pub fn into_values(
        self,
        date: impl Into<String>,
        operation: impl Into<String>,
        id: impl Into<String>,
    ) -> FieldValues {
        BTreeMap::from([
            (fields::FORM_DATE.to_string(), self.form_date),
            (fields::AMOUNT.to_string(), self.amount),
            (fields::COMMISSION.to_string(), self.commission),
            (fields::DATE.to_string(), date.into()),
            (fields::OPERATION.to_string(), operation.into()),
            (fields::RECIPIENT.to_string(), self.recipient),
            (fields::PHONE.to_string(), self.phone),
            (fields::BANK.to_string(), self.bank),
            (fields::ACCOUNT.to_string(), self.account),
            (fields::ID.to_string(), id.into()),
            (fields::MESSAGE.to_string(), self.message),
        ])
    }
}
