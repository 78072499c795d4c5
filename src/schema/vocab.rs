//! Closed vocabularies.
//!
//! Every enumerated field is a Rust enum, so an illegal value cannot exist once
//! a record is built. String tokens are only accepted at the raw-input
//! boundary through `FromStr`, which names the admissible set on failure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $token)] $variant, )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire token.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $token => Ok($name::$variant), )+
                    other => Err(format!(
                        "'{}' is not a valid {}; expected one of: {}",
                        other,
                        $label,
                        $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
                }
            }
        }
    };
}

vocabulary! {
    /// Kind of reasoning engine behind an agent.
    ReasoningEngine, "reasoning engine" {
        Llm => "llm",
        Symbolic => "symbolic",
        NeuroSymbolic => "neuro-symbolic",
        Hybrid => "hybrid",
    }
}

vocabulary! {
    /// Model provider.
    Provider, "provider" {
        OpenAi => "openai",
        Anthropic => "anthropic",
        Cohere => "cohere",
        Local => "local",
        Custom => "custom",
    }
}

vocabulary! {
    /// Operation kinds a role envelope may grant.
    Permission, "permission" {
        Read => "read",
        Write => "write",
        Execute => "execute",
        Audit => "audit",
        Admin => "admin",
    }
}

vocabulary! {
    /// Governance tier of a role envelope.
    GovernanceLevel, "governance level" {
        Core => "core",
        Restricted => "restricted",
        Sandbox => "sandbox",
        Observer => "observer",
    }
}

impl Default for GovernanceLevel {
    fn default() -> Self {
        GovernanceLevel::Sandbox
    }
}

vocabulary! {
    /// Scope tokens a memory credential may carry.
    MemoryScope, "memory scope" {
        MemoryRead => "memory.read",
        MemoryWrite => "memory.write",
        MemorySearch => "memory.search",
        MemoryHandshake => "memory.handshake",
        TrustvaultCommit => "trustvault.commit",
        AuditExport => "audit.export",
    }
}

vocabulary! {
    /// Temperament profile of a persona.
    Temperament, "temperament profile" {
        Strategic => "strategic",
        Empathic => "empathic",
        Analytic => "analytic",
        Stoic => "stoic",
        Adaptive => "adaptive",
    }
}

vocabulary! {
    /// Ethical stance of a persona.
    MoralAccent, "moral accent" {
        Deontic => "deontic",
        Utilitarian => "utilitarian",
        Virtue => "virtue",
        Reflexic => "reflexic",
    }
}
