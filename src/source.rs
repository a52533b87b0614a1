//! Byte sources for [`crate::RowReader`].

use std::io::{self, Read};

/// Read adapter that keeps calling the wrapped source until the request is
/// filled or the source reports end of input.
///
/// [`crate::RowReader`] treats any short read as truncation. Buffered stdin,
/// pipes and sockets return short reads on valid streams whenever a field
/// straddles a buffer or packet boundary; wrap them in `FillSource` first.
/// `Interrupted` errors are retried. Bytes gathered before any other error
/// are dropped along with the error.
#[derive(Debug)]
pub struct FillSource<R> {
    inner: R,
}

impl<R: Read> FillSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for FillSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }
}
