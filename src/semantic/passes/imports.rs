//! Duplicate imports

use crate::ast::NodeId;
use crate::semantic::{AnalysisPass, PassContext, Scope};
use crate::Result;
use std::collections::HashSet;

/// Each import may appear once
pub struct ImportCheck;

impl AnalysisPass for ImportCheck {
    fn name(&self) -> &'static str {
        "import"
    }

    fn visit(&self, _: &mut PassContext<'_>, _: NodeId, _: &Scope<'_>) -> Result<()> {
        Ok(())
    }

    fn finish(&self, cx: &mut PassContext<'_>, scope: &Scope<'_>) -> Result<()> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for import in &scope.table.imports {
            if !seen.insert(import.as_str()) && reported.insert(import.as_str()) {
                cx.error_unlocated(format!("Duplicate import `{}`", import));
            }
        }
        Ok(())
    }
}
