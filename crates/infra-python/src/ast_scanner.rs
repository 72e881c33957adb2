// Python AST scanner
// reason: rustpython-parser gives a real Python syntax tree without running anything
use rustpython_ast::{self as ast, Visitor};
use rustpython_parser::Parse;
use tracing::debug;

use pyexec_core::domain::ScanPolicy;
use pyexec_core::port::{CodeScanner, ScanError};

/// Name reported for `from . import x`, which has no module part
const RELATIVE_IMPORT_NAME: &str = ".";

/// Source path shown in parser error messages
const SOURCE_PATH: &str = "<submission>";

/// Static scanner for Python submissions
///
/// Walks every node of the parsed module and rejects:
/// - bare names in the policy denylist (`exec(...)`, `x = open`)
/// - attribute members in the denylist (`builtins.exec`, `obj.__dict__`)
/// - imports whose top-level package is not allowlisted
///
/// Limitation: this is a gate, not a proof. `import math as m` followed by
/// attribute access through `m`, names assembled at runtime, and anything
/// reachable through allowed modules all pass.
pub struct PythonAstScanner {
    policy: ScanPolicy,
}

impl PythonAstScanner {
    pub fn new(policy: ScanPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }
}

impl Default for PythonAstScanner {
    fn default() -> Self {
        Self::new(ScanPolicy::default())
    }
}

impl CodeScanner for PythonAstScanner {
    fn scan(&self, source: &str) -> Result<(), ScanError> {
        let suite = ast::Suite::parse(source, SOURCE_PATH)
            .map_err(|e| ScanError::Syntax(e.to_string()))?;

        let mut finder = ViolationFinder {
            policy: &self.policy,
            violation: None,
        };
        for stmt in suite {
            finder.visit_stmt(stmt);
            if finder.violation.is_some() {
                break;
            }
        }

        match finder.violation {
            Some(name) => {
                debug!(name = %name, "Static scan found a violation");
                Err(ScanError::Unsafe(name))
            }
            None => Ok(()),
        }
    }
}

/// Records the first violation in traversal order
struct ViolationFinder<'a> {
    policy: &'a ScanPolicy,
    violation: Option<String>,
}

impl ViolationFinder<'_> {
    fn flag(&mut self, name: &str) {
        if self.violation.is_none() {
            self.violation = Some(name.to_string());
        }
    }

    fn check_denied(&mut self, name: &str) {
        if self.policy.is_denied(name) {
            self.flag(name);
        }
    }

    fn check_module(&mut self, module: &str) {
        if !self.policy.allows_module(module) {
            self.flag(module);
        }
    }
}

impl Visitor for ViolationFinder<'_> {
    fn visit_stmt(&mut self, node: ast::Stmt) {
        if self.violation.is_none() {
            self.generic_visit_stmt(node);
        }
    }

    fn visit_expr(&mut self, node: ast::Expr) {
        if self.violation.is_none() {
            self.generic_visit_expr(node);
        }
    }

    fn visit_expr_name(&mut self, node: ast::ExprName) {
        self.check_denied(node.id.as_str());
        self.generic_visit_expr_name(node);
    }

    fn visit_expr_attribute(&mut self, node: ast::ExprAttribute) {
        self.check_denied(node.attr.as_str());
        self.generic_visit_expr_attribute(node);
    }

    fn visit_stmt_import(&mut self, node: ast::StmtImport) {
        for alias in &node.names {
            self.check_module(alias.name.as_str());
        }
        self.generic_visit_stmt_import(node);
    }

    fn visit_stmt_import_from(&mut self, node: ast::StmtImportFrom) {
        match &node.module {
            Some(module) => self.check_module(module.as_str()),
            None => self.flag(RELATIVE_IMPORT_NAME),
        }
        self.generic_visit_stmt_import_from(node);
    }

    // The generated visitor leaves the product nodes below as no-ops,
    // so their expression and statement children are walked here.

    fn visit_withitem(&mut self, node: ast::WithItem) {
        self.visit_expr(node.context_expr);
        if let Some(vars) = node.optional_vars {
            self.visit_expr(*vars);
        }
    }

    fn visit_keyword(&mut self, node: ast::Keyword) {
        self.visit_expr(node.value);
    }

    fn visit_comprehension(&mut self, node: ast::Comprehension) {
        self.visit_expr(node.target);
        self.visit_expr(node.iter);
        for cond in node.ifs {
            self.visit_expr(cond);
        }
    }

    fn visit_arguments(&mut self, node: ast::Arguments) {
        let with_defaults = node
            .posonlyargs
            .into_iter()
            .chain(node.args)
            .chain(node.kwonlyargs);
        for param in with_defaults {
            self.visit_arg(param.def);
            if let Some(default) = param.default {
                self.visit_expr(*default);
            }
        }
        for param in node.vararg.into_iter().chain(node.kwarg) {
            self.visit_arg(*param);
        }
    }

    fn visit_arg(&mut self, node: ast::Arg) {
        if let Some(annotation) = node.annotation {
            self.visit_expr(*annotation);
        }
    }

    fn visit_match_case(&mut self, node: ast::MatchCase) {
        self.visit_pattern(node.pattern);
        if let Some(guard) = node.guard {
            self.visit_expr(*guard);
        }
        for stmt in node.body {
            self.visit_stmt(stmt);
        }
    }
}
