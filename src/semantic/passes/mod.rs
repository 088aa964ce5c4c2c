//! The standard analysis passes, in run order

mod arguments;
mod arrays;
mod assignments;
mod conditions;
mod declarations;
mod imports;
mod operations;
mod returns;
mod undeclared;

pub use arguments::ArgumentCheck;
pub use arrays::ArrayOperationCheck;
pub use assignments::AssignmentCheck;
pub use conditions::ConditionCheck;
pub use declarations::DeclarationTypeCheck;
pub use imports::ImportCheck;
pub use operations::InvalidOperationCheck;
pub use returns::ReturnCheck;
pub use undeclared::UndeclaredVariableCheck;

use super::AnalysisPass;

/// The nine standard passes
pub fn default_passes() -> Vec<Box<dyn AnalysisPass>> {
    vec![
        Box::new(UndeclaredVariableCheck),
        Box::new(InvalidOperationCheck),
        Box::new(ConditionCheck),
        Box::new(ArrayOperationCheck),
        Box::new(ReturnCheck),
        Box::new(AssignmentCheck),
        Box::new(ArgumentCheck),
        Box::new(ImportCheck),
        Box::new(DeclarationTypeCheck),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::ast::builder::Unit;
    use crate::report::Report;
    use crate::semantic::{AnalysisPass, Analyzer, ExternalTypeAssumption};
    use crate::symbols::SymbolTableBuilder;

    /// Run a single pass over a unit
    pub fn run(pass: impl AnalysisPass + 'static, unit: Unit) -> Vec<Report> {
        run_with(pass, unit, ExternalTypeAssumption::AssumeCompatible)
    }

    pub fn run_with(
        pass: impl AnalysisPass + 'static,
        unit: Unit,
        policy: ExternalTypeAssumption,
    ) -> Vec<Report> {
        let tree = unit.build();
        let (table, _) = SymbolTableBuilder::new(&tree).build().unwrap();
        Analyzer::with_passes(vec![Box::new(pass)], policy).analyze(&tree, &table)
    }
}
