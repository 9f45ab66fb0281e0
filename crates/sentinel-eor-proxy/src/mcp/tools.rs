//! Tool catalog exposed through `tools/list` and `tools/call`.

use sentinel_eor_forwarder::{Operation, QueryParameters};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Tool advertised to MCP clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    /// Tool name (the operation's wire name)
    pub name: &'static str,
    /// What the tool returns
    pub description: &'static str,
    /// JSON Schema of the tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn tool_description(operation: Operation) -> &'static str {
    match operation {
        Operation::GetCountries => {
            "List the available countries. Returns the name and ISO3 code of each \
             Asian, Middle Eastern and Pacific country covered by Sentinel Asia."
        }
        Operation::GetMetadata => {
            "Get service metadata: description, licence, methodology and caveats."
        }
        Operation::GetEvents => {
            "Get disaster events (Emergency Observation Requests): name, disaster type, \
             occurrence date, country, requester, GLIDE number and detail page URL."
        }
        Operation::GetProducts => {
            "Get the products (maps, reports) published for one Emergency Observation \
             Request: date, title, download URL, view URL and file type."
        }
    }
}

fn parameter_description(name: &str) -> &'static str {
    match name {
        "countryiso3s" => "Comma-separated ISO3 country codes (e.g. JPN,PHL,CHN)",
        "start_date" => "Start date (YYYYMMDD or YYYY-MM-DD)",
        "end_date" => "End date (YYYYMMDD or YYYY-MM-DD)",
        "url" => "URL of the EOR detail page",
        _ => "",
    }
}

fn input_schema(operation: Operation) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for spec in operation.parameters() {
        properties.insert(
            spec.name.to_string(),
            json!({
                "type": "string",
                "description": parameter_description(spec.name),
            }),
        );
        if spec.required {
            required.push(Value::from(spec.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Definition of the tool backed by `operation`.
pub fn definition(operation: Operation) -> ToolDefinition {
    ToolDefinition {
        name: operation.as_str(),
        description: tool_description(operation),
        input_schema: input_schema(operation),
    }
}

/// Definitions for every operation, in catalog order.
pub fn definitions() -> Vec<ToolDefinition> {
    Operation::ALL.into_iter().map(definition).collect()
}

/// Convert tool-call arguments into query parameters.
///
/// Only string-valued arguments the operation declares are kept.
pub fn arguments_to_params(operation: Operation, arguments: &Map<String, Value>) -> QueryParameters {
    QueryParameters::for_operation(operation, |name| {
        arguments.get(name).and_then(Value::as_str)
    })
}
