//! Mesh establishment over real sockets on the loopback interface.
//! Discovery is skipped: joiners are pointed straight at the host.

use std::net::{TcpListener, TcpStream};
use std::thread;

use open_whist::net::utils::write_prefixed;
use open_whist::net::{host_session, join_session, PeerNetwork, TransportError, WireEvent};

const DOC: &str = r#"{"name": "mesh test", "players": 3}"#;

#[test]
fn three_peers_form_a_full_mesh() {
    let host_listener = TcpListener::bind("0.0.0.0:0").unwrap();
    let host_port = host_listener.local_addr().unwrap().port();
    let host_addr = format!("127.0.0.1:{host_port}").parse().unwrap();

    let host = thread::spawn(move || {
        host_session(host_listener, None, DOC.to_string(), 3, 42).unwrap()
    });
    let joiners: Vec<_> = (0..2)
        .map(|_| {
            thread::spawn(move || {
                let listener = TcpListener::bind("0.0.0.0:0").unwrap();
                join_session(host_addr, listener).unwrap()
            })
        })
        .collect();

    let mut host_net = host.join().unwrap();
    let mut peer_nets: Vec<PeerNetwork> = joiners.into_iter().map(|j| j.join().unwrap()).collect();
    peer_nets.sort_by_key(PeerNetwork::local_seat);

    assert_eq!(host_net.local_seat(), 0);
    assert_eq!(peer_nets[0].local_seat(), 1);
    assert_eq!(peer_nets[1].local_seat(), 2);
    for net in peer_nets.iter().chain(std::iter::once(&host_net)) {
        assert_eq!(net.player_count(), 3);
        assert_eq!(net.seed(), 42);
        assert_eq!(net.spec_document(), DOC);
    }

    // The host speaks; both joiners hear it on seat 0's link.
    let bid = WireEvent::Bid {
        suit: Some("HEARTS".to_string()),
        value: 3,
        blind: false,
        doubling: false,
    };
    host_net.broadcast(&bid);
    for net in &mut peer_nets {
        assert_eq!(net.receive_event(0).unwrap(), bid);
    }

    // The highest seat speaks; the host and the middle seat hear it on
    // seat 2's link, so the mesh is complete in both directions.
    let play = WireEvent::Play {
        suit: "CLUBS".to_string(),
        rank: "NINE".to_string(),
    };
    peer_nets[1].broadcast(&play);
    assert_eq!(host_net.receive_event(2).unwrap(), play);
    assert_eq!(peer_nets[0].receive_event(2).unwrap(), play);
}

#[test]
fn host_rejects_a_connection_that_does_not_join() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let host = thread::spawn(move || host_session(listener, None, "{}".to_string(), 2, 1));

    let mut rogue = TcpStream::connect(addr).unwrap();
    write_prefixed(&mut rogue, &WireEvent::Ready { player_index: 9 }).unwrap();

    assert!(matches!(
        host.join().unwrap(),
        Err(TransportError::UnexpectedMessage(_))
    ));
}
