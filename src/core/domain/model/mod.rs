pub mod alert;
pub mod chat_message;
pub mod endpoint_config;
pub mod instance_data;
pub mod metric;
pub mod node;
pub mod session_status;
pub mod status;
pub mod user_settings;
pub mod virtual_resource;

pub use alert::{Alert, AlertResourceType, AlertSeverity};
pub use chat_message::{ChatMessage, Sender};
pub use endpoint_config::{EndpointConfig, EndpointReadiness};
pub use instance_data::InstanceData;
pub use metric::{CpuMetric, Metric};
pub use node::{
    ClusterInfo, NetworkInterface, Node, ProxmoxService, StoragePool, Temperature,
    TemperatureUnit,
};
pub use session_status::{SessionStatus, StatusKind};
pub use status::Status;
pub use user_settings::{AlertThresholds, UserSettings};
pub use virtual_resource::{BackupState, BackupStatus, ResourceType, VirtualResource};
