/// Estado de un Step en tiempo de ejecución.
///
/// Transiciones válidas:
/// - `Pending` -> `Running`
/// - `Running` -> `FinishedOk`
/// - `Running` -> `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Running,
    FinishedOk,
    /// Terminal: el flujo no continúa.
    Failed,
}
