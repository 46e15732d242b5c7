use crate::run_service::RunMode;

#[derive(Debug, Clone, PartialEq)]
pub enum RunStage {
    LoadingJob,
    LoadingData,
    Identifying,
    Tuning,
    SavingResults,
    Completed,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub mode: RunMode,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingJob => "loading job",
            RunStage::LoadingData => "loading data",
            RunStage::Identifying => "identifying",
            RunStage::Tuning => "tuning",
            RunStage::SavingResults => "saving",
            RunStage::Completed => "completed",
        }
    }
}
