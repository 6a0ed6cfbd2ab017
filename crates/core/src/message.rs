//! Outbound messages and per-node inboxes.

use indexmap::IndexMap;
use portnum_types::Port;

/// Where an outgoing message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// A single local port.
    Port(Port),
    /// Every incident port of the sender, the same payload on each.
    Broadcast,
}

/// A message a node emits in one round.
///
/// A node sends at most one `Outgoing` per round. "No message" is expressed
/// by `send` returning `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing<M> {
    pub payload: M,
    pub destination: Destination,
}

impl<M> Outgoing<M> {
    /// Send `payload` on a single port.
    pub fn to_port(payload: M, port: Port) -> Self {
        Self {
            payload,
            destination: Destination::Port(port),
        }
    }

    /// Send `payload` on every incident port.
    pub fn broadcast(payload: M) -> Self {
        Self {
            payload,
            destination: Destination::Broadcast,
        }
    }
}

/// Messages delivered to one node in one round, keyed by the receiving port.
///
/// Entries keep delivery order, but `receive` implementations must not depend
/// on it: treat the inbox as a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox<M> {
    entries: IndexMap<Port, M>,
}

impl<M> Default for Inbox<M> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<M> Inbox<M> {
    /// Create an empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a payload on `port`.
    ///
    /// Returns the payload back if the port already holds a message this
    /// round. Existing entries are never overwritten.
    pub fn deliver(&mut self, port: Port, payload: M) -> Result<(), M> {
        if self.entries.contains_key(&port) {
            return Err(payload);
        }
        self.entries.insert(port, payload);
        Ok(())
    }

    /// The message received on `port`, if any.
    pub fn get(&self, port: Port) -> Option<&M> {
        self.entries.get(&port)
    }

    /// Iterate `(port, payload)` in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = (Port, &M)> {
        self.entries.iter().map(|(port, payload)| (*port, payload))
    }

    /// Ports whose payload satisfies `predicate`.
    pub fn ports_where<'a>(
        &'a self,
        mut predicate: impl FnMut(&M) -> bool + 'a,
    ) -> impl Iterator<Item = Port> + 'a {
        self.entries
            .iter()
            .filter(move |(_, payload)| predicate(*payload))
            .map(|(port, _)| *port)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M> FromIterator<(Port, M)> for Inbox<M> {
    /// Collect an inbox from `(port, payload)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if two payloads name the same port. Use
    /// [`deliver`](Inbox::deliver) to handle that case.
    fn from_iter<I: IntoIterator<Item = (Port, M)>>(iter: I) -> Self {
        let mut inbox = Inbox::new();
        for (port, payload) in iter {
            if inbox.deliver(port, payload).is_err() {
                panic!("two payloads for port {port}");
            }
        }
        inbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_rejects_second_message_on_port() {
        let mut inbox = Inbox::new();
        assert_eq!(inbox.deliver(Port(2), "first"), Ok(()));
        assert_eq!(inbox.deliver(Port(2), "second"), Err("second"));
        assert_eq!(inbox.get(Port(2)), Some(&"first"));
        assert_eq!(inbox.len(), 1);
    }

    #[test]
    fn test_ports_where() {
        let inbox: Inbox<u8> = [(Port(3), 1), (Port(1), 2), (Port(2), 1)]
            .into_iter()
            .collect();
        let ones: Vec<Port> = inbox.ports_where(|m| *m == 1).collect();
        assert_eq!(ones, vec![Port(3), Port(2)]);
        assert!(!inbox.is_empty());
    }

    #[test]
    #[should_panic(expected = "two payloads for port")]
    fn test_collect_refuses_second_payload_on_port() {
        let _: Inbox<u8> = [(Port(1), 1), (Port(1), 2)].into_iter().collect();
    }

    #[test]
    fn test_outgoing_constructors() {
        let direct = Outgoing::to_port('x', Port(4));
        assert_eq!(direct.destination, Destination::Port(Port(4)));
        let all = Outgoing::broadcast('y');
        assert_eq!(all.destination, Destination::Broadcast);
    }
}
