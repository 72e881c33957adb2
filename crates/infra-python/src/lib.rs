// PyExec Infrastructure - Python front end
// Implements: CodeScanner

pub mod ast_scanner;

pub use ast_scanner::PythonAstScanner;
