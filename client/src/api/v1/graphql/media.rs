use super::schema;

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CameraStatus {
    #[cynic(rename = "isConnected")]
    pub is_connected: bool,
    pub status: String,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct VideoStreamStatus {
    #[cynic(rename = "isRunning")]
    pub is_running: bool,
    pub status: Option<String>,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cynic(graphql_type = "VideoStreamStatus")]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct VideoStreamStarted {
    #[cynic(rename = "isRunning")]
    pub is_running: bool,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct StopVideoStreamStatus {
    #[cynic(rename = "isStopped")]
    pub is_stopped: bool,
    pub status: String,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct QueryCameraStatus {
    pub camera_status: CameraStatus,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct QueryVideoStreamStatus {
    pub video_stream_status: VideoStreamStatus,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation")]
pub struct MutateStartVideoStream {
    pub start_video_stream: VideoStreamStarted,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation")]
pub struct MutateStopVideoStream {
    pub stop_video_stream: StopVideoStreamStatus,
}
