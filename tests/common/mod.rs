//! Shared utilities for integration tests.
//!
//! `MockRedis` is a tiny in-memory server speaking enough RESP2 for the
//! durable counter tier: PING, AUTH, SELECT, INCR, GET, SET .. EX, DEL, and
//! EVAL (treated as increment-and-expire, the only script the client sends).

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

type Data = Arc<Mutex<HashMap<String, (Vec<u8>, Option<Instant>)>>>;

pub struct MockRedis {
    addr: SocketAddr,
    data: Data,
    paused: Arc<AtomicBool>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl MockRedis {
    /// Bind on an ephemeral localhost port and start serving.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let data: Data = Arc::new(Mutex::new(HashMap::new()));
        let paused = Arc::new(AtomicBool::new(false));
        let tasks = Arc::new(Mutex::new(Vec::new()));

        let accept = {
            let data = data.clone();
            let paused = paused.clone();
            let tasks = tasks.clone();
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let handle = tokio::spawn(serve(socket, data.clone(), paused.clone()));
                    tasks.lock().unwrap().push(handle);
                }
            })
        };
        tasks.lock().unwrap().push(accept);

        Self { addr, data, paused, tasks }
    }

    pub fn url(&self) -> String {
        format!("redis://{}", self.addr)
    }

    /// Stop answering without closing sockets; calls hang until their deadline.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Close the listener and every open connection.
    pub fn kill(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
    }

    /// Raw stored value, ignoring expiry.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap()
            .get(key)
            .map(|(v, _)| String::from_utf8_lossy(v).into_owned())
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.as_bytes().to_vec(), None));
    }
}

impl Drop for MockRedis {
    fn drop(&mut self) {
        self.kill();
    }
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("redis://{}", addr)
}

async fn serve(socket: TcpStream, data: Data, paused: Arc<AtomicBool>) {
    let mut stream = BufReader::new(socket);
    loop {
        let args = match read_command(&mut stream).await {
            Some(args) => args,
            None => return,
        };
        if paused.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let reply = execute(&data, &args);
        if stream.get_mut().write_all(&reply).await.is_err() {
            return;
        }
    }
}

async fn read_command(stream: &mut BufReader<TcpStream>) -> Option<Vec<Vec<u8>>> {
    let mut line = String::new();
    if stream.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        stream.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0u8; len + 2];
        stream.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(buf);
    }
    Some(args)
}

fn live<'a>(
    map: &'a mut HashMap<String, (Vec<u8>, Option<Instant>)>,
    key: &str,
) -> Option<&'a mut (Vec<u8>, Option<Instant>)> {
    let expired = matches!(map.get(key), Some((_, Some(at))) if *at <= Instant::now());
    if expired {
        map.remove(key);
    }
    map.get_mut(key)
}

fn incr(map: &mut HashMap<String, (Vec<u8>, Option<Instant>)>, key: &str) -> Result<i64, Vec<u8>> {
    let current = match live(map, key) {
        Some((value, _)) => std::str::from_utf8(value)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| b"-ERR value is not an integer or out of range\r\n".to_vec())?,
        None => 0,
    };
    let next = current + 1;
    let expiry = map.get(key).and_then(|(_, e)| *e);
    map.insert(key.to_string(), (next.to_string().into_bytes(), expiry));
    Ok(next)
}

fn execute(data: &Data, args: &[Vec<u8>]) -> Vec<u8> {
    let command = String::from_utf8_lossy(&args[0]).to_uppercase();
    let arg = |i: usize| String::from_utf8_lossy(&args[i]).into_owned();
    let mut map = data.lock().unwrap();

    match command.as_str() {
        "PING" => b"+PONG\r\n".to_vec(),
        "AUTH" | "SELECT" => b"+OK\r\n".to_vec(),
        "INCR" => match incr(&mut map, &arg(1)) {
            Ok(n) => format!(":{}\r\n", n).into_bytes(),
            Err(e) => e,
        },
        "EVAL" => {
            // EVAL script 1 key ttl
            let key = arg(3);
            let ttl: u64 = arg(4).parse().unwrap_or(1);
            match incr(&mut map, &key) {
                Ok(n) => {
                    if let Some(entry) = map.get_mut(&key) {
                        entry.1 = Some(Instant::now() + Duration::from_secs(ttl));
                    }
                    format!(":{}\r\n", n).into_bytes()
                }
                Err(e) => e,
            }
        }
        "GET" => match live(&mut map, &arg(1)) {
            Some((value, _)) => {
                let mut out = format!("${}\r\n", value.len()).into_bytes();
                out.extend_from_slice(value);
                out.extend_from_slice(b"\r\n");
                out
            }
            None => b"$-1\r\n".to_vec(),
        },
        "SET" => {
            let expiry = if args.len() >= 5 && arg(3).eq_ignore_ascii_case("EX") {
                arg(4).parse::<u64>().ok().map(|s| Instant::now() + Duration::from_secs(s))
            } else {
                None
            };
            map.insert(arg(1), (args[2].clone(), expiry));
            b"+OK\r\n".to_vec()
        }
        "DEL" => {
            let removed = args[1..]
                .iter()
                .filter(|k| map.remove(&*String::from_utf8_lossy(k)).is_some())
                .count();
            format!(":{}\r\n", removed).into_bytes()
        }
        other => format!("-ERR unknown command '{}'\r\n", other).into_bytes(),
    }
}
