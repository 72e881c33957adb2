// PyExec Infrastructure - System Adapters
// Implements: CodeStager, ProcessLauncher, LivenessProbe

pub mod file_stager;
pub mod process_table_probe;
pub mod subprocess_launcher;

pub use file_stager::FileStager;
pub use process_table_probe::ProcessTableProbe;
pub use subprocess_launcher::{SpawnedChild, SubprocessLauncher};
