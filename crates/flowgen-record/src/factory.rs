//! Record factory: fills pooled slots with fresh synthetic events.

use crate::pool::{PooledRecord, RecordPool};
use crate::random::{set_display, set_flag, set_int63, set_ipv4, set_port, set_str};
use crate::FlowLogRecord;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// RFC 3339 at second precision, always in UTC.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// Synthetic profile: a Redis session seen from a Quickwit searcher pod.
const APP_DST: &str = "tf-bin-prod-quickwit";
const APP_SRC: &str = "quickwit";
const AUTO_INSTANCE_SRC: &str = "quickwit-searcher-86987c5bfc-lb9q5";
const INTERNET_IP: &str = "internet_ip";
const POD: &str = "pod";
const AUTO_SERVICE_SRC: &str = "quickwit-searcher";
const AZ_SRC: &str = "ap-northeast-1d";
const BIZ_SRC: &str = "searcher";
const DB_CLUSTER_NAME: &str = "tf-bin-prod-quickwit-searcher";
const DB_INSTANCE_NAME: &str = "tf-bin-prod-quickwit-searcher-0016-001";
const DB_STATEMENT: &str = "GET An architecture built for performance and scalability";
const DF_INFO: &str = "l7_flow_log";
const FEATURE_SRC: &str = "official";
const L3_EPC: &str = "-2";
const L7_PROTOCOL: &str = "Redis";
const METRIC_NAME: &str = "ebpf_l7_redis";
const NETWORK_PROTOCOL: &str = "TCP";
const POD_CLUSTER_SRC: &str = "tf-bin-prod-be-eks";
const POD_ID_SRC: &str = "293382";
const POD_NODE_SRC: &str = "ip-192-119-50-221.ap-east-10.compute.internal";
const TEAM: &str = "backend";
const REQUEST_TYPE: &str = "GET";
const RESPONSE_CODE: &str = "-256";
const SERVER_PORT: &str = "6379";
const SIGNAL_SOURCE: &str = "Packet";
const STATUS: &str = "Success";
const TAP_PORT_TYPE: &str = "Local NIC";
const TAP_SIDE: &str = "Other NIC";
const TOPIC: &str = "ebpf_l7_redis";
const KIND: &str = "session";
const VTAP: &str = "ip-192-119-50-221.ap-east-10.compute.internal-V22128";

/// Issues record identities.
///
/// Identities start at 1 and are handed out by a single atomic increment, so
/// concurrent callers never see the same value and a later call in program
/// order always sees a larger one.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: AtomicU64,
}

impl MessageIdGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Allocate the next identity.
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued identity, or 0 if none has been issued.
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

/// Identity source shared by every factory in the process.
static MSG_IDS: MessageIdGenerator = MessageIdGenerator::new();

/// The process-wide identity source.
pub fn message_ids() -> &'static MessageIdGenerator {
    &MSG_IDS
}

/// Produces synthetic flow-log records backed by a [`RecordPool`].
///
/// The factory is `Sync`; share it by reference (or `Arc`) between producers.
/// Identities come from [`message_ids`], so they stay unique and increasing
/// across every factory the process creates.
#[derive(Default)]
pub struct RecordFactory {
    pool: RecordPool,
}

impl RecordFactory {
    /// Create a factory whose pool retains up to `pool_capacity` idle slots.
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            pool: RecordPool::new(pool_capacity),
        }
    }

    /// Build one fully-populated record.
    ///
    /// The record lives in a pooled slot; dropping the returned guard hands
    /// the slot back. Every field of the slot is rewritten, so nothing from
    /// the slot's previous occupant survives.
    pub fn produce(&self) -> PooledRecord<'_> {
        let mut record = self.pool.checkout();
        let msg_id = MSG_IDS.next_id();
        fill_record(&mut record, msg_id, Utc::now(), &mut rand::thread_rng());
        record
    }

    pub fn pool(&self) -> &RecordPool {
        &self.pool
    }

    pub fn ids(&self) -> &'static MessageIdGenerator {
        &MSG_IDS
    }
}

/// Overwrite every field of `record`.
pub fn fill_record<R: Rng + ?Sized>(
    record: &mut FlowLogRecord,
    msg_id: u64,
    now: DateTime<Utc>,
    rng: &mut R,
) {
    set_display(&mut record.msg_id, msg_id);
    set_str(&mut record.app_dst, APP_DST);
    set_str(&mut record.app_src, APP_SRC);
    set_ipv4(&mut record.auto_instance_dst, rng);
    set_str(&mut record.auto_instance_src, AUTO_INSTANCE_SRC);
    set_str(&mut record.auto_instance_type_dst, INTERNET_IP);
    set_str(&mut record.auto_instance_type_src, POD);
    set_ipv4(&mut record.auto_service_dst, rng);
    set_str(&mut record.auto_service_src, AUTO_SERVICE_SRC);
    set_str(&mut record.auto_service_type_dst, INTERNET_IP);
    set_str(&mut record.az_src, AZ_SRC);
    set_str(&mut record.biz_src, BIZ_SRC);
    set_port(&mut record.client_port, rng);
    set_str(&mut record.db_cluster_name, DB_CLUSTER_NAME);
    set_str(&mut record.db_instance_name, DB_INSTANCE_NAME);
    set_str(&mut record.db_statement, DB_STATEMENT);
    set_str(&mut record.df_info, DF_INFO);
    record.duration = rng.gen::<f64>();
    set_str(&mut record.epc_dst, "0");
    set_str(&mut record.epc_src, "0");
    set_str(&mut record.feature_src, FEATURE_SRC);
    set_int63(&mut record.flow_id, rng);
    set_int63(&mut record.flow_info_id, rng);
    set_ipv4(&mut record.ip_dst, rng);
    set_ipv4(&mut record.ip_src, rng);
    set_flag(&mut record.is_tls, rng);
    set_str(&mut record.l3_epc_dst, L3_EPC);
    set_str(&mut record.l3_epc_src, L3_EPC);
    set_str(&mut record.l7_protocol, L7_PROTOCOL);
    set_str(&mut record.metric_name, METRIC_NAME);
    set_str(&mut record.network_protocol, NETWORK_PROTOCOL);
    set_str(&mut record.pod_cluster_src, POD_CLUSTER_SRC);
    set_str(&mut record.pod_id_dst, "0");
    set_str(&mut record.pod_id_src, POD_ID_SRC);
    set_str(&mut record.pod_node_src, POD_NODE_SRC);
    set_str(&mut record.pod_ns_src, TEAM);
    set_str(&mut record.private_ip_dst, "true");
    set_str(&mut record.private_ip_src, "true");
    set_int63(&mut record.req_tcp_seq, rng);
    set_str(&mut record.request_type, REQUEST_TYPE);
    set_int63(&mut record.resp_tcp_seq, rng);
    set_str(&mut record.response_code, RESPONSE_CODE);
    set_str(&mut record.server_port, SERVER_PORT);
    set_str(&mut record.signal_source, SIGNAL_SOURCE);
    set_str(&mut record.status, STATUS);
    set_str(&mut record.tap_port_type, TAP_PORT_TYPE);
    set_str(&mut record.tap_side, TAP_SIDE);
    set_str(&mut record.team_src, TEAM);
    set_str(&mut record.tenant, "");
    set_display(&mut record.timestamp, now.format(TIMESTAMP_FORMAT));
    set_str(&mut record.topic, TOPIC);
    set_str(&mut record.kind, KIND);
    set_str(&mut record.vtap_dst, VTAP);
    set_int63(&mut record.vtap_id, rng);
    set_str(&mut record.vtap_src, VTAP);
}
