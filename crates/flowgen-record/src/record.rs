//! The fixed-shape synthetic flow-log record.

use serde::{Deserialize, Serialize};

/// Number of fields carried by every [`FlowLogRecord`].
pub const FIELD_COUNT: usize = 55;

/// Serialized field names, in declaration order.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "msg_id",
    "app_dst",
    "app_src",
    "auto_instance_dst",
    "auto_instance_src",
    "auto_instance_type_dst",
    "auto_instance_type_src",
    "auto_service_dst",
    "auto_service_src",
    "auto_service_type_dst",
    "az_src",
    "biz_src",
    "client_port",
    "db_cluster_name",
    "db_instance_name",
    "db_statement",
    "df_info",
    "duration",
    "epc_dst",
    "epc_src",
    "feature_src",
    "flow_id",
    "flow_info_id",
    "ip_dst",
    "ip_src",
    "is_tls",
    "l3_epc_dst",
    "l3_epc_src",
    "l7_protocol",
    "metric_name",
    "network_protocol",
    "pod_cluster_src",
    "pod_id_dst",
    "pod_id_src",
    "pod_node_src",
    "pod_ns_src",
    "private_ip_dst",
    "private_ip_src",
    "req_tcp_seq",
    "request_type",
    "resp_tcp_seq",
    "response_code",
    "server_port",
    "signal_source",
    "status",
    "tap_port_type",
    "tap_side",
    "team_src",
    "tenant",
    "timestamp",
    "topic",
    "type",
    "vtap_dst",
    "vtap_id",
    "vtap_src",
];

/// The one field serialized as a JSON number; every other field is a string.
pub const NUMERIC_FIELD: &str = "duration";

/// One synthetic L7 flow-log event.
///
/// Every field is always populated. An empty string is a legitimate value
/// (`tenant` is empty in the synthetic profile), never a stand-in for
/// "missing". Records are normally obtained from
/// [`RecordFactory::produce`](crate::RecordFactory::produce) rather than built
/// by hand so that their storage is recycled through the
/// [`RecordPool`](crate::RecordPool).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowLogRecord {
    pub msg_id: String,
    pub app_dst: String,
    pub app_src: String,
    pub auto_instance_dst: String,
    pub auto_instance_src: String,
    pub auto_instance_type_dst: String,
    pub auto_instance_type_src: String,
    pub auto_service_dst: String,
    pub auto_service_src: String,
    pub auto_service_type_dst: String,
    pub az_src: String,
    pub biz_src: String,
    pub client_port: String,
    pub db_cluster_name: String,
    pub db_instance_name: String,
    pub db_statement: String,
    pub df_info: String,
    pub duration: f64,
    pub epc_dst: String,
    pub epc_src: String,
    pub feature_src: String,
    pub flow_id: String,
    pub flow_info_id: String,
    pub ip_dst: String,
    pub ip_src: String,
    pub is_tls: String,
    pub l3_epc_dst: String,
    pub l3_epc_src: String,
    pub l7_protocol: String,
    pub metric_name: String,
    pub network_protocol: String,
    pub pod_cluster_src: String,
    pub pod_id_dst: String,
    pub pod_id_src: String,
    pub pod_node_src: String,
    pub pod_ns_src: String,
    pub private_ip_dst: String,
    pub private_ip_src: String,
    pub req_tcp_seq: String,
    pub request_type: String,
    pub resp_tcp_seq: String,
    pub response_code: String,
    pub server_port: String,
    pub signal_source: String,
    pub status: String,
    pub tap_port_type: String,
    pub tap_side: String,
    pub team_src: String,
    pub tenant: String,
    pub timestamp: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub vtap_dst: String,
    pub vtap_id: String,
    pub vtap_src: String,
}
