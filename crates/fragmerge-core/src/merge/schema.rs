//! Schema-aware merge over the known configuration sections
//!
//! Every known section is kept as the exact JSON text it was written with,
//! so untouched sections come out formatted the way they went in. The merge
//! rule of each field is data: a table entry naming the field and the kind
//! of slot it occupies. Tables are matched exhaustively, so adding a field
//! without deciding how it merges does not compile.
//!
//! Only `routing.rules` and `outbounds` are reordered by priority, and the
//! hint is left inside each element.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;
use tracing::trace;

use super::Strategy;
use super::priority::sort_by_priority;
use crate::error::{MergeError, Result};

/// A section kept as its original JSON text
pub type RawSection = Box<RawValue>;

/// Known top-level sections of a configuration document
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Listening port (legacy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<RawSection>,
    /// Logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<RawSection>,
    /// Routing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingSection>,
    /// DNS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<RawSection>,
    /// Inbound definitions
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub inbounds: Vec<RawSection>,
    /// Outbound definitions
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub outbounds: Vec<RawSection>,
    /// Single inbound (legacy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<RawSection>,
    /// Single outbound (legacy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<RawSection>,
    /// Extra inbounds (legacy)
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub inbound_detour: Vec<RawSection>,
    /// Extra outbounds (legacy)
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub outbound_detour: Vec<RawSection>,
    /// Transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<RawSection>,
    /// Policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<RawSection>,
    /// API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<RawSection>,
    /// Statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<RawSection>,
    /// Reverse proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<RawSection>,
}

/// The `routing` section
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSection {
    /// Legacy settings block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<RawSection>,
    /// Routing rules
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RawSection>,
    /// Domain strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_strategy: Option<RawSection>,
    /// Balancers
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub balancers: Vec<RawSection>,
}

impl RoutingSection {
    fn is_zero(&self) -> bool {
        self.settings.is_none()
            && self.rules.is_empty()
            && self.domain_strategy.is_none()
            && self.balancers.is_empty()
    }
}

/// `null` lists decode as empty
fn nullable_list<'de, D>(deserializer: D) -> std::result::Result<Vec<RawSection>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawSection>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Mutable view of one field
enum Slot<'a> {
    Opaque(&'a mut Option<RawSection>),
    List(&'a mut Vec<RawSection>),
    Routing(&'a mut Option<RoutingSection>),
}

impl Slot<'_> {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Opaque(_) => "raw",
            Self::List(_) => "list",
            Self::Routing(_) => "routing",
        }
    }
}

/// A field of a known section and the slot it merges through
trait SectionField: Copy + 'static {
    type Section;

    /// Every field, in output order
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn slot(self, section: &mut Self::Section) -> Slot<'_>;
}

#[derive(Clone, Copy)]
enum DocumentField {
    Port,
    Log,
    Routing,
    Dns,
    Inbounds,
    Outbounds,
    Inbound,
    Outbound,
    InboundDetour,
    OutboundDetour,
    Transport,
    Policy,
    Api,
    Stats,
    Reverse,
}

impl SectionField for DocumentField {
    type Section = ConfigDocument;

    const ALL: &'static [Self] = &[
        Self::Port,
        Self::Log,
        Self::Routing,
        Self::Dns,
        Self::Inbounds,
        Self::Outbounds,
        Self::Inbound,
        Self::Outbound,
        Self::InboundDetour,
        Self::OutboundDetour,
        Self::Transport,
        Self::Policy,
        Self::Api,
        Self::Stats,
        Self::Reverse,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Port => "port",
            Self::Log => "log",
            Self::Routing => "routing",
            Self::Dns => "dns",
            Self::Inbounds => "inbounds",
            Self::Outbounds => "outbounds",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::InboundDetour => "inboundDetour",
            Self::OutboundDetour => "outboundDetour",
            Self::Transport => "transport",
            Self::Policy => "policy",
            Self::Api => "api",
            Self::Stats => "stats",
            Self::Reverse => "reverse",
        }
    }

    fn slot(self, doc: &mut ConfigDocument) -> Slot<'_> {
        match self {
            Self::Port => Slot::Opaque(&mut doc.port),
            Self::Log => Slot::Opaque(&mut doc.log),
            Self::Routing => Slot::Routing(&mut doc.routing),
            Self::Dns => Slot::Opaque(&mut doc.dns),
            Self::Inbounds => Slot::List(&mut doc.inbounds),
            Self::Outbounds => Slot::List(&mut doc.outbounds),
            Self::Inbound => Slot::Opaque(&mut doc.inbound),
            Self::Outbound => Slot::Opaque(&mut doc.outbound),
            Self::InboundDetour => Slot::List(&mut doc.inbound_detour),
            Self::OutboundDetour => Slot::List(&mut doc.outbound_detour),
            Self::Transport => Slot::Opaque(&mut doc.transport),
            Self::Policy => Slot::Opaque(&mut doc.policy),
            Self::Api => Slot::Opaque(&mut doc.api),
            Self::Stats => Slot::Opaque(&mut doc.stats),
            Self::Reverse => Slot::Opaque(&mut doc.reverse),
        }
    }
}

#[derive(Clone, Copy)]
enum RoutingField {
    Settings,
    Rules,
    DomainStrategy,
    Balancers,
}

impl SectionField for RoutingField {
    type Section = RoutingSection;

    const ALL: &'static [Self] = &[
        Self::Settings,
        Self::Rules,
        Self::DomainStrategy,
        Self::Balancers,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Rules => "rules",
            Self::DomainStrategy => "domainStrategy",
            Self::Balancers => "balancers",
        }
    }

    fn slot(self, routing: &mut RoutingSection) -> Slot<'_> {
        match self {
            Self::Settings => Slot::Opaque(&mut routing.settings),
            Self::Rules => Slot::List(&mut routing.rules),
            Self::DomainStrategy => Slot::Opaque(&mut routing.domain_strategy),
            Self::Balancers => Slot::List(&mut routing.balancers),
        }
    }
}

/// Schema-aware merge strategy over [`ConfigDocument`]
pub struct SchemaMerge;

impl Strategy for SchemaMerge {
    type Document = ConfigDocument;

    fn fold(accumulator: &mut Self::Document, mut fragment: Self::Document) -> Result<()> {
        merge_section::<DocumentField>(accumulator, &mut fragment, "")
    }

    fn finish(accumulator: &mut Self::Document) -> Result<()> {
        if let Some(routing) = accumulator.routing.as_mut() {
            trace!(count = routing.rules.len(), "sorting routing rules");
            sort_by_priority(&mut routing.rules, raw_priority);
        }
        trace!(count = accumulator.outbounds.len(), "sorting outbounds");
        sort_by_priority(&mut accumulator.outbounds, raw_priority);
        Ok(())
    }
}

fn merge_section<F: SectionField>(
    target: &mut F::Section,
    source: &mut F::Section,
    parent: &str,
) -> Result<()> {
    for &field in F::ALL {
        match (field.slot(target), field.slot(source)) {
            (Slot::Opaque(existing), Slot::Opaque(incoming)) => {
                // first non-zero section wins
                if existing.is_none() {
                    *existing = incoming.take();
                }
            }
            (Slot::List(existing), Slot::List(incoming)) => existing.append(incoming),
            (Slot::Routing(existing), Slot::Routing(incoming)) => {
                let Some(mut routing) = incoming.take().filter(|r| !r.is_zero()) else {
                    continue;
                };
                match existing {
                    Some(current) if !current.is_zero() => {
                        let path = key_path(parent, field.name());
                        merge_section::<RoutingField>(current, &mut routing, &path)?;
                    }
                    _ => *existing = Some(routing),
                }
            }
            (_, incoming) => {
                return Err(MergeError::TypeMismatch {
                    key: key_path(parent, field.name()),
                    kind: incoming.kind(),
                });
            }
        }
    }

    Ok(())
}

#[derive(Deserialize)]
struct PriorityProbe {
    #[serde(default)]
    priority: Option<Value>,
}

/// Decode just far enough to read the element's priority
fn raw_priority(raw: &RawSection) -> f64 {
    serde_json::from_str::<PriorityProbe>(raw.get())
        .ok()
        .and_then(|probe| probe.priority)
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0)
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
