use hat_eeprom::utils::checksum::checksum;

/// Hand-assembles raw images, including ones the encoder refuses to emit
pub struct ImageBuilder {
    signature: [u8; 4],
    version: u8,
    atom_count: Option<u16>,
    image_len: Option<u32>,
    atoms: Vec<Vec<u8>>,
    padding: usize,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            signature: *b"R-Pi",
            version: 1,
            atom_count: None,
            image_len: None,
            atoms: Vec::new(),
            padding: 0,
        }
    }

    pub fn signature(mut self, signature: [u8; 4]) -> Self {
        self.signature = signature;
        self
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Override the header's atom count
    pub fn atom_count(mut self, count: u16) -> Self {
        self.atom_count = Some(count);
        self
    }

    /// Override the header's image length
    pub fn image_len(mut self, len: u32) -> Self {
        self.image_len = Some(len);
        self
    }

    /// Append a correctly framed atom
    pub fn atom(self, atom_type: u16, payload: &[u8]) -> Self {
        let index = self.atoms.len() as u16;
        self.atom_with_count(atom_type, index, payload)
    }

    /// Append a correctly framed atom with an explicit count field
    pub fn atom_with_count(mut self, atom_type: u16, count: u16, payload: &[u8]) -> Self {
        let mut frame = Vec::new();
        frame.extend_from_slice(&atom_type.to_le_bytes());
        frame.extend_from_slice(&count.to_le_bytes());
        frame.extend_from_slice(&(payload.len() as u32 + 2).to_le_bytes());
        frame.extend_from_slice(payload);
        let crc = checksum(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());
        self.atoms.push(frame);
        self
    }

    /// Append raw bytes as if they were an atom frame
    pub fn raw_atom(mut self, frame: &[u8]) -> Self {
        self.atoms.push(frame.to_vec());
        self
    }

    /// Append erased-EEPROM padding after the image
    pub fn padding(mut self, len: usize) -> Self {
        self.padding = len;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let body: Vec<u8> = self.atoms.concat();
        let count = self.atom_count.unwrap_or(self.atoms.len() as u16);
        let len = self.image_len.unwrap_or(12 + body.len() as u32);

        let mut data = Vec::new();
        data.extend_from_slice(&self.signature);
        data.push(self.version);
        data.push(0);
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&body);
        data.resize(data.len() + self.padding, 0xFF);
        data
    }
}

/// Raw vendor info payload
pub fn vendor_payload(uuid_le: [u8; 16], pid: u16, pver: u16, vendor: &[u8], product: &[u8]) -> Vec<u8> {
    let mut p = uuid_le.to_vec();
    p.extend_from_slice(&pid.to_le_bytes());
    p.extend_from_slice(&pver.to_le_bytes());
    p.push(vendor.len() as u8);
    p.push(product.len() as u8);
    p.extend_from_slice(vendor);
    p.extend_from_slice(product);
    p
}

/// Raw GPIO map payload
pub fn gpio_payload(bank: u8, power: u8, pins: &[(usize, u8)]) -> Vec<u8> {
    let mut p = vec![0u8; 30];
    p[0] = bank;
    p[1] = power;
    for &(pin, byte) in pins {
        p[2 + pin] = byte;
    }
    p
}
