//! Tool catalogue
//!
//! One entry per Qonto endpoint. Each entry knows its path template and how
//! every argument maps onto the wire, so a single dispatcher can serve all
//! tools.

use crate::mcp::protocol::{Tool, ToolAnnotations};
use crate::qonto::QueryParams;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Argument errors raised before any request is sent
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    #[error("Invalid value for parameter '{name}': expected {expected}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    StringList,
}

impl ParamKind {
    fn expected(self) -> &'static str {
        match self {
            ParamKind::String => "a string",
            ParamKind::Integer => "an integer",
            ParamKind::Boolean => "a boolean",
            ParamKind::StringList => "a list of strings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

/// Value sent when the caller omits a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Str(&'static str),
    Int(i64),
}

impl ParamDefault {
    fn to_json(self) -> Value {
        match self {
            ParamDefault::Str(s) => json!(s),
            ParamDefault::Int(n) => json!(n),
        }
    }

    fn to_wire(self) -> String {
        match self {
            ParamDefault::Str(s) => s.to_string(),
            ParamDefault::Int(n) => n.to_string(),
        }
    }
}

/// One tool argument
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// Argument name as exposed to MCP clients
    pub name: &'static str,
    /// Query key on the wire (`status[]`, `filter[status]`, ...)
    pub wire_name: &'static str,
    pub kind: ParamKind,
    pub location: ParamLocation,
    pub required: bool,
    pub default: Option<ParamDefault>,
    pub description: &'static str,
}

impl ParamSpec {
    /// Required path parameter filling the `{name}` placeholder
    pub const fn path(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            wire_name: name,
            kind: ParamKind::String,
            location: ParamLocation::Path,
            required: true,
            default: None,
            description,
        }
    }

    pub const fn query(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            wire_name: name,
            kind,
            location: ParamLocation::Query,
            required: false,
            default: None,
            description,
        }
    }

    /// Array filter sent as repeated `wire_name` keys
    pub const fn list(
        name: &'static str,
        wire_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            wire_name,
            kind: ParamKind::StringList,
            location: ParamLocation::Query,
            required: false,
            default: None,
            description,
        }
    }

    pub const fn wire(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }

    pub const fn default_str(mut self, value: &'static str) -> Self {
        self.default = Some(ParamDefault::Str(value));
        self
    }

    pub const fn default_int(mut self, value: i64) -> Self {
        self.default = Some(ParamDefault::Int(value));
        self
    }

    fn schema(&self) -> Value {
        let mut schema = match self.kind {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Integer => json!({ "type": "integer" }),
            ParamKind::Boolean => json!({ "type": "boolean" }),
            ParamKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
        };
        schema["description"] = json!(self.description);
        if let Some(default) = self.default {
            schema["default"] = default.to_json();
        }
        schema
    }

    /// Convert a JSON argument into its wire values.
    ///
    /// `Ok(None)` means the argument counts as absent.
    fn encode(&self, value: &Value) -> Result<Option<Vec<String>>, ArgumentError> {
        let invalid = || ArgumentError::Invalid {
            name: self.name,
            expected: self.kind.expected(),
        };

        let encoded = match (self.kind, value) {
            (_, Value::Null) => return Ok(None),

            (ParamKind::String, Value::String(s)) => vec![s.trim().to_string()],
            (ParamKind::String, Value::Number(n)) => vec![n.to_string()],
            (ParamKind::String, Value::Bool(b)) => vec![b.to_string()],

            (ParamKind::Integer, Value::Number(n)) => match n.as_i64() {
                Some(i) => vec![i.to_string()],
                None => return Err(invalid()),
            },
            (ParamKind::Integer, Value::String(s)) if s.trim().is_empty() => return Ok(None),
            (ParamKind::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(i) => vec![i.to_string()],
                Err(_) => return Err(invalid()),
            },

            (ParamKind::Boolean, Value::Bool(b)) => vec![b.to_string()],
            (ParamKind::Boolean, Value::String(s)) if s.trim().is_empty() => return Ok(None),
            (ParamKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" => vec!["true".to_string()],
                "false" => vec!["false".to_string()],
                _ => return Err(invalid()),
            },

            (ParamKind::StringList, Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.trim().to_string()),
                    Value::Number(n) => Ok(n.to_string()),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<_>, _>>()?,
            (ParamKind::StringList, Value::String(s)) => {
                s.split(',').map(|item| item.trim().to_string()).collect()
            }

            _ => return Err(invalid()),
        };

        let encoded: Vec<String> = encoded.into_iter().filter(|v| !v.is_empty()).collect();
        if encoded.is_empty() {
            Ok(None)
        } else {
            Ok(Some(encoded))
        }
    }
}

/// A resolved tool call: what to request from Qonto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    pub segments: Vec<String>,
    pub query: QueryParams,
}

/// One MCP tool backed by one Qonto GET endpoint
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Path relative to the API base URL, with `{param}` placeholders
    pub path: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolSpec {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// MCP tool definition
    pub fn to_tool(&self) -> Tool {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in self.params {
            properties.insert(param.name.to_string(), param.schema());
            if param.required {
                required.push(param.name);
            }
        }

        Tool {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
            annotations: Some(ToolAnnotations {
                read_only_hint: Some(true),
                open_world_hint: Some(true),
            }),
        }
    }

    /// Map call arguments onto path segments and query parameters
    pub fn resolve(&self, args: &HashMap<String, Value>) -> Result<ToolRequest, ArgumentError> {
        for key in args.keys() {
            if self.param(key).is_none() {
                tracing::debug!("Ignoring unknown argument '{}' for tool {}", key, self.name);
            }
        }

        let mut path_values: HashMap<&str, String> = HashMap::new();
        let mut query = QueryParams::new();

        for param in self.params {
            let values = match args.get(param.name) {
                Some(value) => param.encode(value)?,
                None => None,
            };

            let values = match (values, param.default) {
                (Some(values), _) => values,
                (None, Some(default)) => vec![default.to_wire()],
                (None, None) if param.required => return Err(ArgumentError::Missing(param.name)),
                (None, None) => continue,
            };

            match param.location {
                ParamLocation::Path => {
                    let value = values.into_iter().next().ok_or(ArgumentError::Missing(param.name))?;
                    // URL normalisation would drop these and change the endpoint
                    if value == "." || value == ".." {
                        return Err(ArgumentError::Invalid {
                            name: param.name,
                            expected: "an identifier other than '.' or '..'",
                        });
                    }
                    path_values.insert(param.name, value);
                }
                ParamLocation::Query => query.push_all(param.wire_name, values),
            }
        }

        let segments = self
            .path
            .split('/')
            .map(|segment| match placeholder(segment) {
                Some(name) => path_values.remove(name).ok_or(ArgumentError::Missing(name)),
                None => Ok(segment.to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ToolRequest { segments, query })
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

const PAGE: ParamSpec = ParamSpec::query("page", ParamKind::Integer, "Returned page of pagination.");
const PER_PAGE: ParamSpec =
    ParamSpec::query("per_page", ParamKind::Integer, "Number of items per page of pagination.");

/// Every tool exposed by the server
pub static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "list_external_transfers",
        description: "Retrieves the list of external transfers for the authenticated organization. \
                      Can be filtered by status, update and scheduled dates, and beneficiaries.",
        path: "external_transfers",
        params: &[
            ParamSpec::list(
                "status",
                "status[]",
                "Filter by status. Available options: pending, processing, canceled, declined, settled.",
            ),
            ParamSpec::query(
                "updated_at_from",
                ParamKind::String,
                "Only transfers updated at or after this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "updated_at_to",
                ParamKind::String,
                "Only transfers updated at or before this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "scheduled_date_from",
                ParamKind::String,
                "Only transfers scheduled at or after this ISO 8601 date.",
            ),
            ParamSpec::query(
                "scheduled_date_to",
                ParamKind::String,
                "Only transfers scheduled at or before this ISO 8601 date.",
            ),
            ParamSpec::list("beneficiary_ids", "beneficiary_ids[]", "Filter by beneficiary IDs."),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Sort order. Available options: updated_at:asc, updated_at:desc, \
                 scheduled_date:asc, scheduled_date:desc.",
            ),
            PAGE,
            PER_PAGE,
        ],
    },
    ToolSpec {
        name: "retrieve_an_external_transfer",
        description: "Retrieves the external transfer identified by its ID, including debit IBAN, \
                      amounts, status and beneficiary.",
        path: "external_transfers/{id}",
        params: &[ParamSpec::path(
            "id",
            "ID of the external transfer, e.g. '7b7a5ed6-3983-47b2-89fd-0cf44bd7bef9'.",
        )],
    },
    ToolSpec {
        name: "list_beneficiaries",
        description: "Retrieves the list of beneficiaries for the authenticated organization. \
                      For SEPA beneficiaries prefer list_sepa_beneficiaries; this endpoint remains \
                      the way to list international beneficiaries.",
        path: "beneficiaries",
        params: &[
            ParamSpec::query("trusted", ParamKind::Boolean, "Filter by the trusted flag."),
            ParamSpec::list(
                "status",
                "status[]",
                "Filter by status. Available options: pending, validated, declined.",
            ),
            ParamSpec::list("iban", "iban[]", "Filter by IBANs."),
            ParamSpec::query(
                "updated_at_from",
                ParamKind::String,
                "Only beneficiaries updated at or after this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "updated_at_to",
                ParamKind::String,
                "Only beneficiaries updated at or before this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Sort order. Available options: updated_at:desc, updated_at:asc.",
            )
            .default_str("updated_at:desc"),
            PAGE,
            PER_PAGE,
        ],
    },
    ToolSpec {
        name: "retrieve_a_beneficiary",
        description: "Retrieves the beneficiary identified by its ID. A beneficiary is 'pending' \
                      until a transfer or Strong Customer Authentication has been done, then \
                      'validated'.",
        path: "beneficiaries/{id}",
        params: &[ParamSpec::path(
            "id",
            "ID of the beneficiary, e.g. 'e72f4e63-9f27-4415-8781-adb46a859c7f'.",
        )],
    },
    ToolSpec {
        name: "list_sepa_beneficiaries",
        description: "Returns the list of SEPA beneficiaries for the authenticated organization, \
                      with name, IBAN, currency and activity tag.",
        path: "sepa/beneficiaries",
        params: &[
            ParamSpec::list("iban", "iban[]", "Filter by IBANs."),
            ParamSpec::list(
                "status",
                "status[]",
                "Filter by status. Available options: pending, validated, declined.",
            ),
            ParamSpec::query("trusted", ParamKind::Boolean, "Filter by the trusted flag."),
            PAGE.default_int(1),
            PER_PAGE.default_int(25),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Sort order as property:direction. Available options: updated_at:desc, updated_at:asc.",
            )
            .default_str("updated_at:desc"),
        ],
    },
    ToolSpec {
        name: "retrieve_a_sepa_beneficiary",
        description: "Returns a SEPA beneficiary by ID.",
        path: "sepa/beneficiaries/{id}",
        params: &[ParamSpec::path("id", "ID of the SEPA beneficiary.")],
    },
    ToolSpec {
        name: "retrieve_an_attachment",
        description: "Retrieves an attachment (invoice or receipt uploaded on a transaction) by ID. \
                      The download URL in the response is valid for 30 minutes.",
        path: "attachments/{id}",
        params: &[ParamSpec::path(
            "id",
            "ID of the attachment, e.g. 'e7274e43-9f27-4a15-8781-adb44a859c7f'.",
        )],
    },
    ToolSpec {
        name: "list_labels",
        description: "Retrieves all the labels for the authenticated organization. Label IDs are \
                      referenced by the label_ids of transactions; parent_id links nested labels.",
        path: "labels",
        params: &[PAGE, PER_PAGE],
    },
    ToolSpec {
        name: "retrieve_a_label",
        description: "Retrieves the label identified by its ID.",
        path: "labels/{id}",
        params: &[ParamSpec::path(
            "id",
            "ID of the label, e.g. '2d96a3fd-1748-4ed4-a590-48066ae9e1cb'.",
        )],
    },
    ToolSpec {
        name: "list_memberships",
        description: "Retrieves all the memberships (users granted access to the Qonto account) \
                      for the authenticated organization.",
        path: "memberships",
        params: &[PAGE, PER_PAGE],
    },
    ToolSpec {
        name: "retrieve_the_authenticated_organization",
        description: "Retrieves the authenticated organization and its bank accounts (IBAN, BIC, \
                      currency, balance). Account IDs and IBANs are needed to list transactions.",
        path: "organization",
        params: &[ParamSpec::query(
            "include_external_accounts",
            ParamKind::Boolean,
            "Also include connected external accounts. Defaults to false.",
        )],
    },
    ToolSpec {
        name: "list_transactions",
        description: "Retrieves the transactions of a bank account, identified by bank_account_id \
                      or iban. Supports filtering by status, side, operation type and dates.",
        path: "transactions",
        params: &[
            ParamSpec::query(
                "bank_account_id",
                ParamKind::String,
                "ID of the bank account whose transactions are listed.",
            ),
            ParamSpec::query(
                "iban",
                ParamKind::String,
                "IBAN of the bank account whose transactions are listed.",
            ),
            ParamSpec::list(
                "includes",
                "includes[]",
                "Embed associated resources. Available options: labels, attachments, vat_details.",
            ),
            ParamSpec::list(
                "status",
                "status[]",
                "Filter by status. Available options: pending, declined, completed.",
            ),
            ParamSpec::query(
                "updated_at_from",
                ParamKind::String,
                "Only transactions updated at or after this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "updated_at_to",
                ParamKind::String,
                "Only transactions updated at or before this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "settled_at_from",
                ParamKind::String,
                "Only transactions settled at or after this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "settled_at_to",
                ParamKind::String,
                "Only transactions settled at or before this ISO 8601 date time.",
            ),
            ParamSpec::list("side", "side[]", "Filter by side. Available options: debit, credit."),
            ParamSpec::list(
                "operation_type",
                "operation_type[]",
                "Filter by operation type, e.g. transfer, card, direct_debit, income.",
            ),
            ParamSpec::query(
                "with_attachments",
                ParamKind::Boolean,
                "Filter on the presence of one or more attachments.",
            ),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Sort as PROPERTY:ORDER with property updated_at, settled_at, amount_cents or id.",
            ),
            PAGE,
            PER_PAGE,
        ],
    },
    ToolSpec {
        name: "retrieve_a_transaction",
        description: "Retrieves the transaction identified by its ID.",
        path: "transactions/{transaction_id}",
        params: &[
            ParamSpec::path("transaction_id", "ID of the transaction."),
            ParamSpec::list(
                "includes",
                "includes[]",
                "Embed associated resources. Available options: vat_details, labels, attachments.",
            ),
        ],
    },
    ToolSpec {
        name: "list_attachments_for_a_transaction",
        description: "Retrieves the attachments of a transaction. Download URLs are valid for \
                      30 minutes.",
        path: "transactions/{id}/attachments",
        params: &[
            ParamSpec::path("id", "ID of the transaction."),
            PAGE,
            PER_PAGE,
        ],
    },
    ToolSpec {
        name: "list_requests",
        description: "Retrieves the list of requests (cards, transfers, ...) for the authenticated \
                      organization.",
        path: "requests",
        params: &[
            ParamSpec::list(
                "status",
                "status[]",
                "Filter by status. Available options: pending, approved, declined, expired, canceled.",
            ),
            ParamSpec::list(
                "request_type",
                "request_type[]",
                "Filter by request type, e.g. flash_card, virtual_card, transfer, multi_transfer.",
            ),
            ParamSpec::query(
                "created_at_from",
                ParamKind::String,
                "Only requests created at or after this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "processed_at_from",
                ParamKind::String,
                "Only requests processed at or after this ISO 8601 date time.",
            ),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Sort as property:order with property processed_at, created_at, status, id or type.",
            ),
            PAGE,
            PER_PAGE,
        ],
    },
    ToolSpec {
        name: "list_supplier_invoices",
        description: "Retrieves the list of supplier invoices for the authenticated organization.",
        path: "supplier_invoices",
        params: &[
            ParamSpec::query("filter_status", ParamKind::String, "Filter invoices by status.")
                .wire("filter[status]"),
            PAGE,
            ParamSpec::query(
                "per_page",
                ParamKind::Integer,
                "Number of invoices per page (1-100).",
            )
            .default_int(1),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Sort as {property}_{asc|desc} with property created_at, file_name, supplier_name, \
                 payment_date, due_date, scheduled_date or total_amount. Server default: created_at_desc.",
            ),
            ParamSpec::query(
                "filter_created_at_from",
                ParamKind::String,
                "Only invoices created at or after this ISO 8601 date time.",
            )
            .wire("filter[created_at_from]"),
            ParamSpec::query(
                "filter_created_at_to",
                ParamKind::String,
                "Only invoices created at or before this ISO 8601 date time.",
            )
            .wire("filter[created_at_to]"),
        ],
    },
    ToolSpec {
        name: "retrieve_a_supplier_invoice",
        description: "Retrieves the supplier invoice identified by its ID.",
        path: "supplier_invoices/{invoice_id}",
        params: &[ParamSpec::path("invoice_id", "ID of the supplier invoice.")],
    },
    ToolSpec {
        name: "list_client_invoices",
        description: "Retrieves the list of client invoices for the authenticated organization.",
        path: "client_invoices",
        params: &[
            ParamSpec::query(
                "filter_status",
                ParamKind::String,
                "Filter by status. Available options: draft, unpaid, paid, canceled.",
            )
            .wire("filter[status]"),
            ParamSpec::query(
                "filter_created_at_from",
                ParamKind::String,
                "Only invoices created at or after this ISO 8601 date time.",
            )
            .wire("filter[created_at_from]"),
            ParamSpec::query(
                "filter_created_at_to",
                ParamKind::String,
                "Only invoices created at or before this ISO 8601 date time.",
            )
            .wire("filter[created_at_to]"),
            PAGE,
            ParamSpec::query(
                "per_page",
                ParamKind::Integer,
                "Number of invoices per page (1-100).",
            )
            .default_int(1),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Available options: created_at_desc, created_at_asc.",
            )
            .default_str("created_at_desc"),
        ],
    },
    ToolSpec {
        name: "retrieve_a_client_invoice",
        description: "Retrieves the client invoice identified by its ID.",
        path: "client_invoices/{id}",
        params: &[ParamSpec::path("id", "ID of the client invoice.")],
    },
    ToolSpec {
        name: "list_credit_notes",
        description: "Retrieves the list of credit notes for the authenticated organization.",
        path: "credit_notes",
        params: &[
            ParamSpec::query(
                "filter_created_at_from",
                ParamKind::String,
                "Only credit notes created at or after this ISO 8601 date time.",
            )
            .wire("filter[created_at_from]"),
            ParamSpec::query(
                "filter_created_at_to",
                ParamKind::String,
                "Only credit notes created at or before this ISO 8601 date time.",
            )
            .wire("filter[created_at_to]"),
            PAGE,
            ParamSpec::query(
                "per_page",
                ParamKind::Integer,
                "Number of credit notes per page (1-100).",
            )
            .default_int(1),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Available options: created_at_desc, created_at_asc.",
            )
            .default_str("created_at_desc"),
        ],
    },
    ToolSpec {
        name: "retrieve_a_credit_note",
        description: "Retrieves the credit note identified by its ID.",
        path: "credit_notes/{id}",
        params: &[ParamSpec::path("id", "ID of the credit note.")],
    },
    ToolSpec {
        name: "list_clients",
        description: "Retrieves the list of clients for the authenticated organization. Filters \
                      match exactly and case-insensitively.",
        path: "clients",
        params: &[
            ParamSpec::query(
                "filter_tax_identification_number",
                ParamKind::String,
                "Filter by tax identification number.",
            )
            .wire("filter[tax_identification_number]"),
            ParamSpec::query("filter_vat_number", ParamKind::String, "Filter by VAT number.")
                .wire("filter[vat_number]"),
            ParamSpec::query("filter_email", ParamKind::String, "Filter by email.")
                .wire("filter[email]"),
            ParamSpec::query(
                "filter_name",
                ParamKind::String,
                "Filter by name (at least 2 characters). For individuals and freelancers the name \
                 is first_name-last_name.",
            )
            .wire("filter[name]"),
            PAGE,
            PER_PAGE.default_int(25),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Available options: created_at.asc, created_at.desc, name.asc, name.desc.",
            )
            .default_str("name.asc"),
        ],
    },
    ToolSpec {
        name: "retrieve_a_client",
        description: "Retrieves the client identified by its ID.",
        path: "clients/{id}",
        params: &[ParamSpec::path("id", "ID of the client.")],
    },
    ToolSpec {
        name: "list_statements",
        description: "Retrieves the list of bank statements for the authenticated organization.",
        path: "statements",
        params: &[
            ParamSpec::list(
                "bank_account_ids",
                "bank_account_ids[]",
                "Filter by bank account IDs. Cannot be combined with ibans.",
            ),
            ParamSpec::list(
                "ibans",
                "iban[]",
                "Filter by IBANs. Cannot be combined with bank_account_ids.",
            ),
            ParamSpec::query(
                "period_from",
                ParamKind::String,
                "First period to include, as MM-YYYY, e.g. '01-2023'.",
            ),
            ParamSpec::query(
                "period_to",
                ParamKind::String,
                "Last period to include, as MM-YYYY, e.g. '12-2023'.",
            ),
            ParamSpec::query("page", ParamKind::Integer, "Returned page. Server default: 1."),
            ParamSpec::query(
                "per_page",
                ParamKind::Integer,
                "Number of statements per page (1-100). Server default: 100.",
            ),
            ParamSpec::query(
                "sort_by",
                ParamKind::String,
                "Available options: period:desc, period:asc. Server default: period:desc.",
            ),
        ],
    },
    ToolSpec {
        name: "retrieve_a_statement",
        description: "Retrieves the statement identified by its ID.",
        path: "statements/{id}",
        params: &[ParamSpec::path(
            "id",
            "ID of the statement, e.g. '0854c799-6365-4e85-8487-e835290bcee8'.",
        )],
    },
    ToolSpec {
        name: "list_business_accounts",
        description: "Retrieves all business accounts. Balances are only visible to users with \
                      balance read authorization; owners and admins see every field.",
        path: "bank_accounts",
        params: &[
            ParamSpec::query("page", ParamKind::Integer, "Page number. Server default: 1."),
            ParamSpec::query(
                "per_page",
                ParamKind::Integer,
                "Number of accounts per page (1-100). Server default: 100.",
            ),
        ],
    },
    ToolSpec {
        name: "get_a_business_account",
        description: "Retrieves a business account by ID, including its current and authorized \
                      balance. Useful to verify available funds.",
        path: "bank_accounts/{id}",
        params: &[ParamSpec::path("id", "ID of the business account.")],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn tool(name: &str) -> &'static ToolSpec {
        find_tool(name).unwrap()
    }

    #[test]
    fn test_tool_names_unique() {
        let names: HashSet<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), TOOLS.len());
        assert_eq!(TOOLS.len(), 27);
    }

    #[test]
    fn test_path_placeholders_match_path_params() {
        for tool in TOOLS {
            let placeholders: HashSet<&str> =
                tool.path.split('/').filter_map(placeholder).collect();
            let path_params: HashSet<&str> = tool
                .params
                .iter()
                .filter(|p| p.location == ParamLocation::Path)
                .map(|p| p.name)
                .collect();
            assert_eq!(placeholders, path_params, "tool {}", tool.name);

            for param in tool.params.iter().filter(|p| p.location == ParamLocation::Path) {
                assert!(param.required, "tool {} param {}", tool.name, param.name);
                assert_eq!(param.kind, ParamKind::String);
            }
        }
    }

    #[test]
    fn test_param_names_unique_per_tool() {
        for tool in TOOLS {
            let names: HashSet<_> = tool.params.iter().map(|p| p.name).collect();
            assert_eq!(names.len(), tool.params.len(), "tool {}", tool.name);
        }
    }

    #[test]
    fn test_tool_schema() {
        let schema = tool("list_sepa_beneficiaries").to_tool().input_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["iban"]["type"], "array");
        assert_eq!(schema["properties"]["iban"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["trusted"]["type"], "boolean");
        assert_eq!(schema["properties"]["per_page"]["type"], "integer");
        assert_eq!(schema["properties"]["per_page"]["default"], 25);
        assert_eq!(schema["required"], json!([]));

        let schema = tool("retrieve_a_transaction").to_tool().input_schema;
        assert_eq!(schema["required"], json!(["transaction_id"]));
    }

    #[test]
    fn test_resolve_path_param() {
        let request = tool("list_attachments_for_a_transaction")
            .resolve(&args(json!({"id": "tx-1", "page": 2})))
            .unwrap();
        assert_eq!(request.segments, vec!["transactions", "tx-1", "attachments"]);
        assert_eq!(request.query.to_display_string(), "?page=2");
    }

    #[test]
    fn test_resolve_rejects_dot_segments() {
        for id in [".", "..", " .. "] {
            let err = tool("retrieve_a_beneficiary")
                .resolve(&args(json!({"id": id})))
                .unwrap_err();
            assert!(matches!(err, ArgumentError::Invalid { name: "id", .. }), "{:?}", id);
        }

        let err = tool("list_attachments_for_a_transaction")
            .resolve(&args(json!({"id": ".."})))
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { name: "id", .. }));

        // dots inside an identifier are fine, the client encodes the segment
        let request = tool("retrieve_a_beneficiary")
            .resolve(&args(json!({"id": "../organization"})))
            .unwrap();
        assert_eq!(request.segments, vec!["beneficiaries", "../organization"]);
    }

    #[test]
    fn test_resolve_missing_required() {
        let err = tool("retrieve_a_beneficiary")
            .resolve(&HashMap::new())
            .unwrap_err();
        assert_eq!(err, ArgumentError::Missing("id"));

        let err = tool("retrieve_a_beneficiary")
            .resolve(&args(json!({"id": "   "})))
            .unwrap_err();
        assert_eq!(err, ArgumentError::Missing("id"));
    }

    #[test]
    fn test_resolve_lists_and_bools() {
        let request = tool("list_beneficiaries")
            .resolve(&args(json!({
                "trusted": "TRUE",
                "status": ["pending", "validated"],
                "iban": "FR76 1, FR76 2",
            })))
            .unwrap();

        let pairs: Vec<_> = request.query.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("trusted", "true"),
                ("status[]", "pending"),
                ("status[]", "validated"),
                ("iban[]", "FR76 1"),
                ("iban[]", "FR76 2"),
                ("sort_by", "updated_at:desc"),
            ]
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let request = tool("list_sepa_beneficiaries")
            .resolve(&HashMap::new())
            .unwrap();
        assert_eq!(
            request.query.to_display_string(),
            "?page=1&per_page=25&sort_by=updated_at:desc"
        );

        let request = tool("list_statements").resolve(&HashMap::new()).unwrap();
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_resolve_null_and_empty_are_absent() {
        let request = tool("list_external_transfers")
            .resolve(&args(json!({
                "status": [],
                "sort_by": "",
                "page": null,
                "per_page": "10",
            })))
            .unwrap();
        assert_eq!(request.query.to_display_string(), "?per_page=10");
    }

    #[test]
    fn test_resolve_wire_names() {
        let request = tool("list_supplier_invoices")
            .resolve(&args(json!({
                "filter_status": "to_review",
                "filter_created_at_from": "2024-01-01T00:00:00Z",
            })))
            .unwrap();
        assert_eq!(request.query.get("filter[status]"), Some("to_review"));
        assert_eq!(
            request.query.get("filter[created_at_from]"),
            Some("2024-01-01T00:00:00Z")
        );
        assert_eq!(request.query.get("per_page"), Some("1"));
    }

    #[test]
    fn test_resolve_invalid_types() {
        let err = tool("list_labels")
            .resolve(&args(json!({"page": "two"})))
            .unwrap_err();
        assert_eq!(
            err,
            ArgumentError::Invalid {
                name: "page",
                expected: "an integer"
            }
        );

        let err = tool("list_beneficiaries")
            .resolve(&args(json!({"trusted": "maybe"})))
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { name: "trusted", .. }));

        let err = tool("list_transactions")
            .resolve(&args(json!({"side": [{"x": 1}]})))
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { name: "side", .. }));

        let err = tool("list_labels")
            .resolve(&args(json!({"per_page": 1.5})))
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { name: "per_page", .. }));
    }

    #[test]
    fn test_unknown_arguments_ignored() {
        let request = tool("list_memberships")
            .resolve(&args(json!({"bogus": 1})))
            .unwrap();
        assert!(request.query.is_empty());
        assert_eq!(request.segments, vec!["memberships"]);
    }
}
