//! We use this mocking module in unit tests to emulate the PSU's byte stream.

/// Our mock type used to emulate a TCP link to the PSU.
pub struct MockLink {
    /// Buffer to store data written to the mock link
    write_buffer: heapless::Vec<u8, 256>,
    /// Buffer containing pre-configured response data to be read
    read_buffer: heapless::Vec<u8, 256>,
    /// Current position in the read buffer
    read_position: usize,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
    /// Report end of stream instead of a timeout once the read buffer is drained
    eof_when_drained: bool,
}

#[derive(Debug)]
pub enum MockLinkError {
    /// Simulated read timeout, also returned once the read buffer is drained
    Timeout,
    /// Simulated buffer overflow
    BufferOverflow,
    /// Simulated peer reset
    ConnectionReset,
}

impl core::fmt::Display for MockLinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for MockLinkError {}

impl embedded_io::Error for MockLinkError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockLinkError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockLinkError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockLinkError::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
        }
    }
}

impl embedded_io::ErrorType for MockLink {
    type Error = MockLinkError;
}

impl embedded_io::Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockLinkError::ConnectionReset);
        }

        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockLinkError::BufferOverflow)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockLinkError::ConnectionReset);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockLinkError::ConnectionReset);
        }

        if self.read_position >= self.read_buffer.len() {
            if self.eof_when_drained {
                return Ok(0);
            }
            return Err(MockLinkError::Timeout);
        }

        let available = &self.read_buffer[self.read_position..];
        let bytes_to_read = core::cmp::min(buf.len(), available.len());
        buf[..bytes_to_read].copy_from_slice(&available[..bytes_to_read]);

        self.read_position += bytes_to_read;
        Ok(bytes_to_read)
    }
}

impl MockLink {
    /// Create a new MockLink instance with empty buffers
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            should_error_on_write: false,
            should_error_on_read: false,
            eof_when_drained: false,
        }
    }

    /// Set the data that will be returned when read() is called
    pub fn set_read_data(&mut self, data: &[u8]) -> Result<(), MockLinkError> {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockLinkError::BufferOverflow)
    }

    /// Get a reference to the data that was written to this mock link
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    /// Behave like a peer that closed the connection once the read data runs out
    pub fn set_eof_when_drained(&mut self, eof: bool) {
        self.eof_when_drained = eof;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_write_data() {
        let mut mock = MockLink::new();
        mock.write_all(b"V1?\n").unwrap();
        mock.write_all(b"I1?\n").unwrap();
        assert_eq!(mock.written_data(), b"V1?\nI1?\n");
    }

    #[test]
    fn test_write_buffer_overflow() {
        let mut mock = MockLink::new();
        let large_data = vec![0u8; 300]; // Larger than 256 byte capacity
        let result = mock.write(&large_data);
        assert!(matches!(result, Err(MockLinkError::BufferOverflow)));
    }

    #[test]
    fn test_read_single_bytes_then_timeout() {
        let mut mock = MockLink::new();
        mock.set_read_data(b"ok").unwrap();

        let mut byte = [0u8; 1];
        assert_eq!(mock.read(&mut byte).unwrap(), 1);
        assert_eq!(&byte, b"o");
        assert_eq!(mock.read(&mut byte).unwrap(), 1);
        assert_eq!(&byte, b"k");

        let result = mock.read(&mut byte);
        assert!(matches!(result, Err(MockLinkError::Timeout)));
    }

    #[test]
    fn test_read_eof_when_drained() {
        let mut mock = MockLink::new();
        mock.set_eof_when_drained(true);
        let mut buffer = [0u8; 4];
        assert_eq!(mock.read(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_error_simulation() {
        let mut mock = MockLink::new();
        mock.set_read_data(b"data").unwrap();
        mock.set_read_error(true);
        mock.set_write_error(true);

        let mut buffer = [0u8; 4];
        assert!(mock.read(&mut buffer).is_err());
        assert!(mock.write(b"x").is_err());
        assert!(mock.flush().is_err());
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(MockLinkError::Timeout.kind(), embedded_io::ErrorKind::TimedOut);
        assert_eq!(MockLinkError::BufferOverflow.kind(), embedded_io::ErrorKind::OutOfMemory);
        assert_eq!(
            MockLinkError::ConnectionReset.kind(),
            embedded_io::ErrorKind::ConnectionReset
        );
    }
}
