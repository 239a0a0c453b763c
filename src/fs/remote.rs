use async_trait::async_trait;
use std::io::Cursor;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use suppaftp::types::{FileType, Mode};
use suppaftp::{FtpError, FtpResult, FtpStream, NativeTlsConnector, NativeTlsFtpStream};
use tracing::{debug, info};

use crate::config::ConnectParams;
use crate::error::{StoreError, StoreResult};
use crate::fs::backend::Store;
use crate::fs::path;
use crate::fs::types::{Entry, EntryKind, WalkNode};
use crate::heartbeat::Probe;

/// Reply codes servers use for "cannot create, it is already there".
const DIR_EXISTS_CODES: [u32; 2] = [521, 550];

/// Either a plain or a TLS-enabled control connection.
enum FtpConnection {
    Plain(FtpStream),
    Tls(NativeTlsFtpStream),
}

impl FtpConnection {
    fn list(&mut self, path: Option<&str>) -> FtpResult<Vec<String>> {
        match self {
            FtpConnection::Plain(s) => s.list(path),
            FtpConnection::Tls(s) => s.list(path),
        }
    }

    fn retr_as_buffer(&mut self, path: &str) -> FtpResult<Cursor<Vec<u8>>> {
        match self {
            FtpConnection::Plain(s) => s.retr_as_buffer(path),
            FtpConnection::Tls(s) => s.retr_as_buffer(path),
        }
    }

    fn put_file(&mut self, path: &str, reader: &mut impl std::io::Read) -> FtpResult<u64> {
        match self {
            FtpConnection::Plain(s) => s.put_file(path, reader),
            FtpConnection::Tls(s) => s.put_file(path, reader),
        }
    }

    fn mkdir(&mut self, path: &str) -> FtpResult<()> {
        match self {
            FtpConnection::Plain(s) => s.mkdir(path),
            FtpConnection::Tls(s) => s.mkdir(path),
        }
    }

    fn rm(&mut self, path: &str) -> FtpResult<()> {
        match self {
            FtpConnection::Plain(s) => s.rm(path),
            FtpConnection::Tls(s) => s.rm(path),
        }
    }

    fn rmdir(&mut self, path: &str) -> FtpResult<()> {
        match self {
            FtpConnection::Plain(s) => s.rmdir(path),
            FtpConnection::Tls(s) => s.rmdir(path),
        }
    }

    fn noop(&mut self) -> FtpResult<()> {
        match self {
            FtpConnection::Plain(s) => s.noop(),
            FtpConnection::Tls(s) => s.noop(),
        }
    }

    fn quit(&mut self) -> FtpResult<()> {
        match self {
            FtpConnection::Plain(s) => s.quit(),
            FtpConnection::Tls(s) => s.quit(),
        }
    }
}

/// FTP/FTPS store over a single control connection.
///
/// The connection is blocking, so every call runs on a blocking worker while
/// holding the connection lock. The heartbeat shares the same lock.
#[derive(Clone)]
pub struct FtpStore {
    conn: Arc<Mutex<Option<FtpConnection>>>,
    name: String,
}

impl FtpStore {
    /// Dial, log in and switch to binary/passive mode.
    pub async fn connect(params: &ConnectParams, timeout: Duration) -> StoreResult<Self> {
        let params = params.clone();
        let name = params.server.clone();
        let conn = tokio::task::spawn_blocking(move || Self::connect_blocking(&params, timeout))
            .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            name,
        })
    }

    fn connect_blocking(params: &ConnectParams, timeout: Duration) -> StoreResult<FtpConnection> {
        let addr_str = format!("{}:{}", params.server, params.port);
        let addr = resolve(&addr_str)?;
        let ftp_err = |source| StoreError::Ftp {
            path: addr_str.clone(),
            source,
        };

        let mut conn = if params.tls {
            let connector = suppaftp::native_tls::TlsConnector::new().map_err(|e| StoreError::Io {
                path: addr_str.clone(),
                source: std::io::Error::other(format!("TLS setup failed: {}", e)),
            })?;
            let stream = NativeTlsFtpStream::connect_timeout(addr, timeout)
                .map_err(ftp_err)?
                .into_secure(NativeTlsConnector::from(connector), &params.server)
                .map_err(ftp_err)?;
            FtpConnection::Tls(stream)
        } else {
            FtpConnection::Plain(FtpStream::connect_timeout(addr, timeout).map_err(ftp_err)?)
        };

        match &mut conn {
            FtpConnection::Plain(s) => {
                s.set_mode(Mode::Passive);
                s.login(&params.user, &params.password).map_err(ftp_err)?;
                s.transfer_type(FileType::Binary).map_err(ftp_err)?;
            }
            FtpConnection::Tls(s) => {
                s.set_mode(Mode::Passive);
                s.login(&params.user, &params.password).map_err(ftp_err)?;
                s.transfer_type(FileType::Binary).map_err(ftp_err)?;
            }
        }

        info!(server = %addr_str, user = %params.user, tls = params.tls, "logged in");
        Ok(conn)
    }

    /// Run `op` against the live connection on a blocking worker.
    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut FtpConnection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Task("FTP connection lock poisoned".to_string()))?;
            let stream = guard.as_mut().ok_or(StoreError::Disconnected)?;
            op(stream)
        })
        .await?
    }

    /// Send QUIT and drop the connection. Later calls fail with `Disconnected`.
    pub async fn quit(&self) -> StoreResult<()> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let taken = conn
                .lock()
                .map_err(|_| StoreError::Task("FTP connection lock poisoned".to_string()))?
                .take();
            if let Some(mut stream) = taken {
                stream.quit().map_err(|source| StoreError::Ftp {
                    path: String::new(),
                    source,
                })?;
            }
            Ok(())
        })
        .await?
    }
}

fn resolve(addr: &str) -> StoreResult<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|e| StoreError::io(addr, e))?
        .next()
        .ok_or_else(|| StoreError::NotFound {
            path: addr.to_string(),
        })
}

fn ftp_error(path: &str, source: FtpError) -> StoreError {
    StoreError::Ftp {
        path: path.to_string(),
        source,
    }
}

/// Parse LIST output, skipping unparsable lines and the dot entries.
fn parse_listing(lines: &[String]) -> Vec<Entry> {
    lines
        .iter()
        .filter_map(|line| match suppaftp::list::File::from_str(line) {
            Ok(file) => Some(file),
            Err(_) => {
                debug!(line = %line, "skipping unparsable LIST line");
                None
            }
        })
        .filter(|file| file.name() != "." && file.name() != "..")
        .map(|file| {
            let kind = if file.is_directory() {
                EntryKind::Directory
            } else if file.is_symlink() {
                EntryKind::Link
            } else {
                EntryKind::File
            };
            let size = if kind == EntryKind::File {
                file.size() as u64
            } else {
                0
            };
            Entry::new(file.name(), kind, size)
        })
        .collect()
}

fn list_blocking(conn: &mut FtpConnection, dir: &str) -> StoreResult<Vec<Entry>> {
    let lines = conn.list(Some(dir)).map_err(|e| ftp_error(dir, e))?;
    Ok(parse_listing(&lines))
}

fn walk_blocking(conn: &mut FtpConnection, dir: &str, nodes: &mut Vec<WalkNode>) -> StoreResult<()> {
    nodes.push(WalkNode::new(dir, EntryKind::Directory));

    let mut children = list_blocking(conn, dir)?;
    crate::fs::sort_entries(&mut children);

    for child in children {
        let child_path = path::join(dir, &child.name);
        if child.is_dir() {
            walk_blocking(conn, &child_path, nodes)?;
        } else {
            nodes.push(WalkNode::new(child_path, child.kind));
        }
    }
    Ok(())
}

fn remove_dir_all_blocking(conn: &mut FtpConnection, dir: &str) -> StoreResult<()> {
    for child in list_blocking(conn, dir)? {
        let child_path = path::join(dir, &child.name);
        if child.is_dir() {
            remove_dir_all_blocking(conn, &child_path)?;
        } else {
            conn.rm(&child_path).map_err(|e| ftp_error(&child_path, e))?;
        }
    }
    conn.rmdir(dir).map_err(|e| ftp_error(dir, e))
}

#[async_trait]
impl Store for FtpStore {
    async fn list_dir(&self, path: &str) -> StoreResult<Vec<Entry>> {
        let dir = path.to_string();
        self.with_conn(move |conn| list_blocking(conn, &dir)).await
    }

    async fn walk(&self, root: &str) -> StoreResult<Vec<WalkNode>> {
        let root = path::clean(root);
        self.with_conn(move |conn| {
            let mut nodes = Vec::new();
            walk_blocking(conn, &root, &mut nodes)?;
            Ok(nodes)
        })
        .await
    }

    async fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        let path = path.to_string();
        self.with_conn(move |conn| {
            conn.retr_as_buffer(&path)
                .map(Cursor::into_inner)
                .map_err(|e| ftp_error(&path, e))
        })
        .await
    }

    async fn write_file(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        let path = path.to_string();
        self.with_conn(move |conn| {
            let mut reader = Cursor::new(data);
            conn.put_file(&path, &mut reader)
                .map(|_| ())
                .map_err(|e| ftp_error(&path, e))
        })
        .await
    }

    async fn create_dir(&self, path: &str) -> StoreResult<()> {
        let path = path.to_string();
        self.with_conn(move |conn| match conn.mkdir(&path) {
            Ok(()) => Ok(()),
            Err(FtpError::UnexpectedResponse(resp))
                if DIR_EXISTS_CODES.contains(&resp.status.code()) =>
            {
                Err(StoreError::AlreadyExists { path })
            }
            Err(e) => Err(ftp_error(&path, e)),
        })
        .await
    }

    async fn remove_file(&self, path: &str) -> StoreResult<()> {
        let path = path.to_string();
        self.with_conn(move |conn| conn.rm(&path).map_err(|e| ftp_error(&path, e)))
            .await
    }

    async fn remove_dir_all(&self, path: &str) -> StoreResult<()> {
        let path = path.to_string();
        self.with_conn(move |conn| remove_dir_all_blocking(conn, &path))
            .await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Probe for FtpStore {
    async fn probe(&self) -> StoreResult<()> {
        self.with_conn(|conn| conn.noop().map_err(|e| ftp_error("NOOP", e)))
            .await
    }
}
