//! End-to-end echo tests.
//!
//! Exercises the full callback sequence for a single connection: listen,
//! open, message delivery, echo reply, peer close, connection close.

use crossbeam_channel::{Receiver, Sender, unbounded};
use emberio::{
    Buffer, ConnToken, Endpoint, EventHandler, Listener, Reactor, ReactorCtx, StopHandle,
};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Listen,
    Open,
    Message(Vec<u8>),
    Close,
    Shutdown,
}

struct EchoHandler {
    events: Sender<Event>,
}

impl EventHandler for EchoHandler {
    fn on_listen(&mut self, _ctx: &mut ReactorCtx) {
        let _ = self.events.send(Event::Listen);
    }

    fn on_shutdown(&mut self, _ctx: &mut ReactorCtx) {
        let _ = self.events.send(Event::Shutdown);
    }

    fn on_open(&mut self, ctx: &mut ReactorCtx, conn: ConnToken) {
        let c = ctx.connection(conn).expect("connection present during open");
        assert!(c.is_open());
        assert_eq!(c.token(), conn);
        assert_eq!(c.peer_addr().address(), "127.0.0.1");
        assert_eq!(ctx.open_connections(), 1);
        let _ = self.events.send(Event::Open);
    }

    fn on_message(&mut self, ctx: &mut ReactorCtx, conn: ConnToken, data: &[u8]) {
        let _ = self.events.send(Event::Message(data.to_vec()));
        let mut reply = Buffer::with_capacity(data.len());
        reply.append(data);
        ctx.send(conn, reply);
    }

    fn on_close(&mut self, _ctx: &mut ReactorCtx, _conn: ConnToken) {
        let _ = self.events.send(Event::Close);
    }
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn spawn_server(port: u16, events: Sender<Event>) -> (thread::JoinHandle<()>, StopHandle) {
    let endpoint = Endpoint::v4("127.0.0.1", port as u32).unwrap();
    let listener = Listener::bind(&endpoint, None).unwrap();
    let mut reactor = Reactor::<EchoHandler>::builder()
        .build(EchoHandler { events })
        .unwrap();
    reactor.register_listener(listener).unwrap();
    let stop = reactor.stop_handle();
    let handle = thread::spawn(move || {
        reactor.run(Some(Duration::from_millis(20))).unwrap();
    });
    (handle, stop)
}

fn recv_event(rx: &Receiver<Event>) -> Event {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("timed out waiting for callback")
}

#[test]
fn test_echo_round_trip() {
    let port = free_port();
    let (tx, rx) = unbounded();
    let (handle, stop) = spawn_server(port, tx);

    assert_eq!(recv_event(&rx), Event::Listen);

    let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    client.write_all(b"ping\n").unwrap();

    let mut reply = [0u8; 5];
    client.read_exact(&mut reply).unwrap();
    assert_eq!(&reply, b"ping\n");

    assert_eq!(recv_event(&rx), Event::Open);

    // the chunk may in principle arrive split; concatenate until the close
    drop(client);
    let mut received = Vec::new();
    loop {
        match recv_event(&rx) {
            Event::Message(chunk) => received.extend(chunk),
            Event::Close => break,
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert_eq!(received, b"ping\n");

    stop.stop();
    handle.join().unwrap();
    assert_eq!(recv_event(&rx), Event::Shutdown);
    assert!(rx.try_recv().is_err(), "no callback may follow shutdown");
}

#[test]
fn test_send_order_preserved() {
    let port = free_port();
    let (tx, rx) = unbounded();
    let (handle, stop) = spawn_server(port, tx);

    assert_eq!(recv_event(&rx), Event::Listen);

    let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    // three separate writes echo back in order even when chunks coalesce
    for piece in [b"alpha ".as_slice(), b"beta ".as_slice(), b"gamma".as_slice()] {
        client.write_all(piece).unwrap();
        thread::sleep(Duration::from_millis(10));
    }

    let mut reply = vec![0u8; "alpha beta gamma".len()];
    client.read_exact(&mut reply).unwrap();
    assert_eq!(reply, b"alpha beta gamma");

    drop(client);
    stop.stop();
    handle.join().unwrap();
}
