//! Upstream operations and their fixed parameter sets.

use std::fmt;
use std::str::FromStr;

/// A query parameter an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Query-string key
    pub name: &'static str,
    /// Whether the operation refuses to run without it
    pub required: bool,
}

impl ParameterSpec {
    const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }

    const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }
}

const EVENTS_PARAMS: &[ParameterSpec] = &[
    ParameterSpec::optional("countryiso3s"),
    ParameterSpec::optional("start_date"),
    ParameterSpec::optional("end_date"),
];

const PRODUCTS_PARAMS: &[ParameterSpec] = &[ParameterSpec::required("url")];

/// Named upstream resource-fetch action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Countries covered by the service (name and ISO3 code)
    GetCountries,
    /// Service description, licence, methodology and caveats
    GetMetadata,
    /// Emergency observation request events, optionally filtered
    GetEvents,
    /// Products published for a single event page
    GetProducts,
}

impl Operation {
    /// Every operation, in catalog order.
    pub const ALL: [Self; 4] = [
        Self::GetCountries,
        Self::GetMetadata,
        Self::GetEvents,
        Self::GetProducts,
    ];

    /// Wire name, also used as the upstream path segment.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetCountries => "get_countries",
            Self::GetMetadata => "get_metadata",
            Self::GetEvents => "get_events",
            Self::GetProducts => "get_products",
        }
    }

    /// Parameters this operation forwards, in query-string order.
    pub const fn parameters(self) -> &'static [ParameterSpec] {
        match self {
            Self::GetCountries | Self::GetMetadata => &[],
            Self::GetEvents => EVENTS_PARAMS,
            Self::GetProducts => PRODUCTS_PARAMS,
        }
    }

    /// Names of the parameters that must be present.
    pub fn required_parameters(self) -> impl Iterator<Item = &'static str> {
        self.parameters()
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name matches no known operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation: {}", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
