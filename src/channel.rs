// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Message channels between two parties.
//!
//! A [`Channel`] delivers whole byte messages in order. Each call to [`Channel::write`] corresponds to exactly one
//! call to [`Channel::read_one`] on the other end; framing is the channel's responsibility.

use alloc::vec::Vec;

use snafu::prelude::*;

/// Errors that can arise relating to [`Channel`].
#[derive(Debug, Snafu)]
pub enum ChannelError {
    /// The other end of the channel is gone.
    #[snafu(display("The channel is disconnected"))]
    Disconnected,
}

/// An ordered, message-framed, bidirectional byte channel.
pub trait Channel {
    /// Send a single message.
    fn write(&mut self, message: &[u8]) -> Result<(), ChannelError>;

    /// Receive the next message, blocking until one is available.
    fn read_one(&mut self) -> Result<Vec<u8>, ChannelError>;

    /// Close this end of the channel.
    ///
    /// Any further reads by the other end will fail once pending messages are consumed.
    fn close(&mut self);
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn write(&mut self, message: &[u8]) -> Result<(), ChannelError> {
        (**self).write(message)
    }

    fn read_one(&mut self) -> Result<Vec<u8>, ChannelError> {
        (**self).read_one()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

#[cfg(feature = "std")]
pub use loopback::LoopbackChannel;

#[cfg(feature = "std")]
mod loopback {
    use alloc::vec::Vec;
    use std::sync::mpsc::{channel, Receiver, Sender};

    use crate::channel::{Channel, ChannelError};

    /// An in-process [`Channel`] connecting two threads.
    #[derive(Debug)]
    pub struct LoopbackChannel {
        sender: Option<Sender<Vec<u8>>>,
        receiver: Receiver<Vec<u8>>,
    }

    impl LoopbackChannel {
        /// Generate a connected pair of [`LoopbackChannel`] ends.
        pub fn pair() -> (Self, Self) {
            let (left_sender, right_receiver) = channel();
            let (right_sender, left_receiver) = channel();

            (
                Self {
                    sender: Some(left_sender),
                    receiver: left_receiver,
                },
                Self {
                    sender: Some(right_sender),
                    receiver: right_receiver,
                },
            )
        }
    }

    impl Channel for LoopbackChannel {
        fn write(&mut self, message: &[u8]) -> Result<(), ChannelError> {
            self.sender
                .as_ref()
                .ok_or(ChannelError::Disconnected)?
                .send(message.to_vec())
                .map_err(|_| ChannelError::Disconnected)
        }

        fn read_one(&mut self) -> Result<Vec<u8>, ChannelError> {
            self.receiver.recv().map_err(|_| ChannelError::Disconnected)
        }

        fn close(&mut self) {
            self.sender = None;
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use std::thread;

    use crate::channel::{Channel, LoopbackChannel};

    #[test]
    fn test_ordered_delivery() {
        let (mut left, mut right) = LoopbackChannel::pair();

        let handle = thread::spawn(move || {
            let first = right.read_one().unwrap();
            let second = right.read_one().unwrap();
            right.write(&[first[0] + second[0]]).unwrap();
        });

        left.write(&[1u8]).unwrap();
        left.write(&[2u8]).unwrap();
        assert_eq!(left.read_one().unwrap(), [3u8]);

        handle.join().unwrap();
    }

    #[test]
    fn test_empty_message() {
        let (mut left, mut right) = LoopbackChannel::pair();

        left.write(&[]).unwrap();
        assert!(right.read_one().unwrap().is_empty());
    }

    #[test]
    fn test_close() {
        let (mut left, mut right) = LoopbackChannel::pair();

        // Pending messages survive a close
        left.write(&[7u8]).unwrap();
        left.close();
        assert!(left.write(&[8u8]).is_err());
        assert_eq!(right.read_one().unwrap(), [7u8]);
        assert!(right.read_one().is_err());

        // Dropping an end disconnects it
        drop(left);
        assert!(right.write(&[9u8]).is_err());
    }

    #[test]
    fn test_borrowed_channel() {
        let (mut left, mut right) = LoopbackChannel::pair();

        fn send<C: Channel>(mut channel: C) {
            channel.write(&[42u8]).unwrap();
        }
        send(&mut left);
        assert_eq!(right.read_one().unwrap(), [42u8]);
    }
}
