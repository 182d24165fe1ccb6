//! SafeOps Built-in Steps
//!
//! The governance analysis steps shipped with SafeOps, registered under the
//! `module.function` identifiers workflows refer to:
//!
//! | Identifier                          | Reads                     | Writes                |
//! |-------------------------------------|---------------------------|-----------------------|
//! | `ingest.ingest_codebase`            | codebase directory        | digest                |
//! | `scan.scan_documentation`           | codebase directory        | JSON document checks  |
//! | `scan.scan_tech_stack`              | digest                    | JSON languages        |
//! | `scan.scan_secrets`                 | digest                    | JSON findings         |
//! | `report.generate_governance_report` | the three scan results    | markdown report       |
//!
//! Every step takes named arguments and writes its declared output to the
//! path it is given.

mod digest;
mod documentation;
mod ingest;
mod report;
mod secrets;
mod tech_stack;

use safeops_step::{StepRegistry, step_fn};

pub use digest::{Digest, DigestFile};
pub use documentation::{DocumentCheck, DocumentationReport, scan_documentation};
pub use ingest::ingest_codebase;
pub use report::{ReportInputs, generate_governance_report};
pub use secrets::{SecretFindings, scan_digest, scan_secrets};
pub use tech_stack::{detect_languages, scan_tech_stack};

/// Register every built-in step.
pub fn register_builtin(registry: &mut StepRegistry) -> &mut StepRegistry {
  registry
    .register("ingest", "ingest_codebase", step_fn(ingest_codebase))
    .register("scan", "scan_documentation", step_fn(scan_documentation))
    .register("scan", "scan_tech_stack", step_fn(scan_tech_stack))
    .register("scan", "scan_secrets", step_fn(scan_secrets))
    .register(
      "report",
      "generate_governance_report",
      step_fn(generate_governance_report),
    )
}

/// A registry holding only the built-in steps.
pub fn builtin_registry() -> StepRegistry {
  let mut registry = StepRegistry::new();
  register_builtin(&mut registry);
  registry
}
