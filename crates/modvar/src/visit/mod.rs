//! visitor pattern helpers
mod visit_traversals;
pub use visit_traversals::VisitTraversals;

/// Visitor that visits its subjects
pub trait Visit<T> {
    fn visit(&mut self, value: &T);
}

/// Collects the address of every reference found in an expression
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    pub references: Vec<String>,
}

impl ReferenceCollector {
    pub fn collect(expr: &hcl::Expression) -> Vec<String> {
        let mut collector = Self::default();
        expr.visit_traversals(&mut collector);
        collector.references
    }
}

impl Visit<hcl::Traversal> for ReferenceCollector {
    fn visit(&mut self, traversal: &hcl::Traversal) {
        // the inner expression of a nested traversal is visited on its own
        let hcl::Expression::Variable(var) = &traversal.expr else {
            return;
        };

        let mut address = var.as_str().to_string();
        for operator in &traversal.operators {
            let hcl::TraversalOperator::GetAttr(ident) = operator else {
                break;
            };
            address.push('.');
            address.push_str(ident.as_str());
        }

        self.references.push(address);
    }
}
