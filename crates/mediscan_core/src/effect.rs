#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit {
        request_id: crate::RequestId,
        file_id: crate::FileId,
        filename: String,
    },
    StartSimulatedProgress { request_id: crate::RequestId },
    StopSimulatedProgress,
    OpenPreview { file_id: crate::FileId },
    ClosePreview,
    CopyText { text: String },
}
