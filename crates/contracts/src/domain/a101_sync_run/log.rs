use serde::{Deserialize, Serialize};

/// Outcome of one synchronised business document within a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentResult {
    pub doctype: String,
    pub name: String,

    /// Absent in callback payloads when the external client has nothing to
    /// report; the receiving path fills in the default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocStatus>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warning_codes: Vec<WarningCode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_data: Option<WarningData>,

    /// Derived from (code, data); never hand-edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DocumentResult {
    pub fn new(doctype: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            doctype: doctype.into(),
            name: name.into(),
            status: None,
            warning_codes: Vec::new(),
            warning_data: None,
            message: None,
        }
    }

    /// Log line for a document that has been handed to the external client
    /// but not yet reported back.
    pub fn pending(doctype: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            status: Some(DocStatus::Pending),
            ..Self::new(doctype, name)
        }
    }

    /// Render the document message from its warning codes, one line per
    /// code. Plain text; markup is the presentation layer's business.
    pub fn rendered_warning_message(&self) -> Option<String> {
        if self.warning_codes.is_empty() {
            return None;
        }
        let data = self.warning_data.clone().unwrap_or_default();
        let lines: Vec<String> = self
            .warning_codes
            .iter()
            .map(|code| format!("- {}", warning_message(*code, &data)))
            .collect();
        Some(lines.join("\n"))
    }
}

/// Per-document status within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocStatus {
    Pending,
    Success,
    Warning,
    Error,
}

/// Warning codes reported by the external system, rendered via fixed
/// templates. A document reaches `Warning` status only with at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningCode {
    #[serde(rename = "ACC_MOD")]
    AccMod,
    #[serde(rename = "SEQ_RUPT")]
    SeqRupt,
    #[serde(rename = "OUT_DAT")]
    OutDat,
}

/// Error codes carried by an abort reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "INV_STATUS")]
    InvStatus,
}

/// Context for rendering warning templates; which fields are present
/// depends on the code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WarningData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Context for rendering error templates
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorData {
    pub doctype: String,
    pub docname: String,
    pub status: String,
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("?")
}

/// Fixed code -> template table for warnings
pub fn warning_message(code: WarningCode, data: &WarningData) -> String {
    match code {
        WarningCode::AccMod => format!(
            "The data of {} {} has been updated in Winbooks.",
            field(&data.doctype),
            field(&data.docname)
        ),
        WarningCode::SeqRupt => format!(
            "The reference of this document breaks the sequence. The last reference before this document in Winbooks is: {}",
            field(&data.doc_before)
        ),
        WarningCode::OutDat => format!(
            "The date of this document is out of the accounting period in Winbooks. The accounting period is {} and the date of this document is {}",
            field(&data.period),
            field(&data.date)
        ),
    }
}

/// Fixed code -> template table for errors
pub fn error_message(code: ErrorCode, data: &ErrorData) -> String {
    match code {
        ErrorCode::InvStatus => format!(
            "Cannot synchronise {} {} because it has status {}.",
            data.doctype, data.docname, data.status
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_codes_use_wire_names() {
        let json = serde_json::to_string(&WarningCode::AccMod).unwrap();
        assert_eq!(json, "\"ACC_MOD\"");
        let parsed: WarningCode = serde_json::from_str("\"SEQ_RUPT\"").unwrap();
        assert_eq!(parsed, WarningCode::SeqRupt);
    }

    #[test]
    fn acc_mod_template_names_the_document() {
        let data = WarningData {
            doctype: Some("Sales Invoice".into()),
            docname: Some("SI-0001".into()),
            ..Default::default()
        };
        assert_eq!(
            warning_message(WarningCode::AccMod, &data),
            "The data of Sales Invoice SI-0001 has been updated in Winbooks."
        );
    }

    #[test]
    fn inv_status_template() {
        let data = ErrorData {
            doctype: "Sales Invoice".into(),
            docname: "SI-0001".into(),
            status: "Draft".into(),
        };
        assert_eq!(
            error_message(ErrorCode::InvStatus, &data),
            "Cannot synchronise Sales Invoice SI-0001 because it has status Draft."
        );
    }

    #[test]
    fn rendered_message_joins_codes_line_per_code() {
        let mut doc = DocumentResult::new("Sales Invoice", "SI-0001");
        doc.status = Some(DocStatus::Warning);
        doc.warning_codes = vec![WarningCode::AccMod, WarningCode::SeqRupt];
        doc.warning_data = Some(WarningData {
            doctype: Some("Sales Invoice".into()),
            docname: Some("SI-0001".into()),
            doc_before: Some("SI-0000".into()),
            ..Default::default()
        });
        let message = doc.rendered_warning_message().unwrap();
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("- The data of"));
        assert!(lines[1].contains("SI-0000"));
    }

    #[test]
    fn callback_doc_without_status_deserializes() {
        let doc: DocumentResult =
            serde_json::from_str(r#"{"doctype": "Sales Invoice", "name": "SI-1"}"#).unwrap();
        assert_eq!(doc.status, None);
        assert!(doc.warning_codes.is_empty());
    }
}
