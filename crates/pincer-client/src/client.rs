//! The RPC client orchestrator.
//!
//! Composes a request from a variant mapping, sends it with the accumulated
//! session cookies, drives the framer until a full reply record is
//! available, and exposes the decoded reply.

use std::sync::Arc;

use pincer_proto::{map_to_json, Variant, VariantMap};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::reply::RpcReply;
use crate::transport::{Connection, Wire};

/// Path for cluster queries.
const CLUSTERS_PATH: &str = "/v2/clusters/";

/// Path for job queries and job creation.
const JOBS_PATH: &str = "/v2/jobs/";

/// Path for liveness checks.
const PING_PATH: &str = "/v2/ping/";

/// A client for one controller.
///
/// Cloning is cheap and shares the physical connection (and its session
/// cookies) between the clones; requests are serialized on an internal
/// mutex, and the socket is torn down when the last clone drops. Each clone
/// keeps its own last reply and last error string.
#[derive(Debug, Clone)]
pub struct RpcClient {
    connection: Arc<Mutex<Connection>>,
    reply: RpcReply,
    last_error: String,
}

impl RpcClient {
    /// A client for the given controller; does not connect yet.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            connection: Arc::new(Mutex::new(Connection::new(config))),
            reply: RpcReply::default(),
            last_error: String::new(),
        }
    }

    /// A client running over an already-established byte stream.
    ///
    /// Used by tests (stub transports) and by deployments that bring their
    /// own tunnel; the configured host/port are only used for the `Host:`
    /// request header in that case.
    #[must_use]
    pub fn over_stream(config: ClientConfig, stream: impl Wire + 'static) -> Self {
        let mut connection = Connection::new(config);
        connection.attach(stream);
        Self {
            connection: Arc::new(Mutex::new(connection)),
            reply: RpcReply::default(),
            last_error: String::new(),
        }
    }

    /// The last decoded reply.
    #[must_use]
    pub fn reply(&self) -> &RpcReply {
        &self.reply
    }

    /// The human-readable message of the last failure, empty after a
    /// successful call.
    #[must_use]
    pub fn error_string(&self) -> &str {
        &self.last_error
    }

    /// Connects to the controller.
    ///
    /// Not usually needed: [`RpcClient::send_request`] connects on demand.
    ///
    /// # Errors
    ///
    /// The connection manager's configuration/resolution/connect errors.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        let result = self.connection.lock().await.connect().await;
        self.note_result(&result);
        result
    }

    /// Closes the connection and drops the session cookies.
    pub async fn close(&mut self) {
        self.connection.lock().await.close().await;
    }

    /// The `Server:` header value from the last reply, when any.
    pub async fn server_version(&self) -> String {
        self.connection.lock().await.session().server_version().to_owned()
    }

    /// Sends one request and decodes the reply record.
    ///
    /// Connects first when necessary. The configured token, when set, is
    /// injected into the payload unless the caller already provided one.
    /// A reply body that fails to decode is not an error here: it becomes
    /// a reply whose [`RpcReply::is_ok`] is false.
    ///
    /// # Errors
    ///
    /// Any connection manager failure from the connect/write/read steps.
    pub async fn send_request(
        &mut self,
        path: &str,
        payload: &VariantMap,
    ) -> Result<(), ClientError> {
        let result = self.request_reply(path, payload).await;
        match result {
            Ok(reply) => {
                self.reply = reply;
                self.last_error.clear();
                Ok(())
            }
            Err(error) => {
                self.last_error = error.to_string();
                Err(error)
            }
        }
    }

    /// Extracts the next record from the same response stream.
    ///
    /// Streaming endpoints (continuous job log tailing) send several
    /// records back-to-back; each call decodes one more into
    /// [`RpcClient::reply`]. Returns false on a clean end of stream.
    ///
    /// # Errors
    ///
    /// Any connection manager failure while reading.
    pub async fn next_reply(&mut self) -> Result<bool, ClientError> {
        let mut connection = self.connection.lock().await;

        let record = loop {
            if connection.buffer().has_complete_record() {
                let record = connection.buffer().extract_record().to_vec();
                connection.buffer_mut().consume_record();
                break record;
            }

            match connection.read_chunk().await {
                Ok(0) => {
                    if connection.buffer().is_empty() {
                        return Ok(false);
                    }
                    // Terminator never arrived; take what is buffered.
                    let record = connection.buffer().extract_record().to_vec();
                    connection.buffer_mut().reset(&[]);
                    break record;
                }
                Ok(_) => {}
                Err(error) => {
                    self.last_error = error.to_string();
                    return Err(error);
                }
            }
        };

        connection.session_mut().harvest(&record);
        drop(connection);

        self.reply = decode_record(&record);
        self.last_error.clear();
        Ok(true)
    }

    async fn request_reply(
        &self,
        path: &str,
        payload: &VariantMap,
    ) -> Result<RpcReply, ClientError> {
        let mut connection = self.connection.lock().await;

        if !connection.is_connected() {
            connection.connect().await?;
        }

        let mut fields = payload.clone();
        if let Some(token) = &connection.config().token {
            fields
                .entry("token".into())
                .or_insert_with(|| Variant::from(token.clone()));
        }
        let body = map_to_json(&fields).to_string();

        let request = compose_request(
            path,
            &connection.config().host,
            connection.config().port,
            &connection.session().cookie_header(),
            &body,
        );

        trace!(path, bytes = request.len(), "sending request");
        connection.write_all(request.as_bytes()).await?;

        // Fresh response cycle; streaming leftovers from an earlier call
        // do not belong to this reply.
        connection.buffer_mut().reset(&[]);

        loop {
            if connection.buffer().has_complete_record() {
                break;
            }

            let n = connection.read_chunk().await?;
            if n == 0 {
                if connection.buffer().is_empty() {
                    return Err(ClientError::Protocol(
                        "connection closed before a reply arrived".into(),
                    ));
                }
                // EOF without a terminator; the buffered bytes are the
                // whole reply.
                break;
            }
        }

        let record = connection.buffer().extract_record().to_vec();
        connection.buffer_mut().consume_record();
        connection.session_mut().harvest(&record);
        drop(connection);

        debug!(path, record_bytes = record.len(), "received reply record");
        Ok(decode_record(&record))
    }

    fn note_result(&mut self, result: &Result<(), ClientError>) {
        match result {
            Ok(()) => self.last_error.clear(),
            Err(error) => self.last_error = error.to_string(),
        }
    }

    // ========================================================================
    // Controller operations
    // ========================================================================

    /// Fetches information about all clusters, hosts included.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    pub async fn get_clusters(&mut self) -> Result<(), ClientError> {
        let mut payload = VariantMap::new();
        payload.insert("operation".into(), Variant::from("getAllClusterInfo"));
        payload.insert("with_hosts".into(), Variant::from(true));
        self.send_request(CLUSTERS_PATH, &payload).await
    }

    /// Fetches the job instances of one cluster.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    pub async fn get_job_instances(&mut self, cluster_id: i64) -> Result<(), ClientError> {
        let mut payload = VariantMap::new();
        payload.insert("operation".into(), Variant::from("getJobInstances"));
        payload.insert("cluster_id".into(), Variant::from(cluster_id));
        self.send_request(JOBS_PATH, &payload).await
    }

    /// Fetches one job instance.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    pub async fn get_job_instance(
        &mut self,
        cluster_id: i64,
        job_id: i64,
    ) -> Result<(), ClientError> {
        let mut payload = VariantMap::new();
        payload.insert("operation".into(), Variant::from("getJobInstance"));
        payload.insert("cluster_id".into(), Variant::from(cluster_id));
        payload.insert("job_id".into(), Variant::from(job_id));
        self.send_request(JOBS_PATH, &payload).await
    }

    /// Fetches the log messages of one job, oldest first.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    pub async fn get_job_log(&mut self, cluster_id: i64, job_id: i64) -> Result<(), ClientError> {
        let mut payload = VariantMap::new();
        payload.insert("operation".into(), Variant::from("getJobLog"));
        payload.insert("cluster_id".into(), Variant::from(cluster_id));
        payload.insert("job_id".into(), Variant::from(job_id));
        payload.insert("ascending".into(), Variant::from(true));
        self.send_request(JOBS_PATH, &payload).await
    }

    /// Creates a rolling-restart job on the cluster.
    ///
    /// The reply carries the created job instance; progress is observed by
    /// polling [`RpcClient::get_job_instance`].
    ///
    /// # Errors
    ///
    /// Any transport failure.
    pub async fn rolling_restart(&mut self, cluster_id: i64) -> Result<(), ClientError> {
        let mut job_spec = VariantMap::new();
        job_spec.insert("command".into(), Variant::from("rolling_restart"));

        let mut job = VariantMap::new();
        job.insert("class_name".into(), Variant::from("job_instance"));
        job.insert("job_spec".into(), Variant::from(job_spec));

        let mut payload = VariantMap::new();
        payload.insert("operation".into(), Variant::from("createJobInstance"));
        payload.insert("cluster_id".into(), Variant::from(cluster_id));
        payload.insert("job".into(), Variant::from(job));

        self.send_request(JOBS_PATH, &payload).await
    }

    /// Liveness check against the controller.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    pub async fn ping(&mut self) -> Result<(), ClientError> {
        let mut payload = VariantMap::new();
        payload.insert("operation".into(), Variant::from("ping"));
        self.send_request(PING_PATH, &payload).await
    }
}

/// Frames the HTTP-like request: request line, headers including the
/// accumulated cookies, blank line, JSON body.
fn compose_request(
    path: &str,
    host: &str,
    port: u16,
    cookie_header: &str,
    body: &str,
) -> String {
    format!(
        "POST {path} HTTP/1.0\r\n\
         Host: {host}:{port}\r\n\
         User-Agent: pincer/{version}\r\n\
         Connection: keep-alive\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {length}\r\n\
         {cookie_header}\r\n\
         {body}",
        version = env!("CARGO_PKG_VERSION"),
        length = body.len(),
    )
}

/// Splits headers from the JSON body and decodes it. A record with no
/// header section is all body.
fn decode_record(record: &[u8]) -> RpcReply {
    let body = match find_subsequence(record, b"\r\n\r\n") {
        Some(index) => &record[index + 4..],
        None => record,
    };

    match Variant::parse_object(body) {
        Ok(map) => RpcReply::new(map),
        Err(error) => RpcReply::malformed(error.to_string()),
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
