/**
 * CRC-16/ANSI polynomial, as used by the AFD2 firmware updater. The MSP430
 * routine works from the least significant bit of each byte and reverses the
 * result, which is the reflected ("ARC") flavour of this CRC.
 */
pub const POLYNOMIAL: u16 = 0x8005;

pub const MSP430_CRC16: crc::Algorithm<u16> = crc::Algorithm {
    width: 16,
    poly: POLYNOMIAL,
    init: 0x0000,
    refin: true,
    refout: true,
    xorout: 0x0000,
    check: 0xbb3d,
    residue: 0x0000,
};

const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&MSP430_CRC16);

pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/**
 * Bit-serial CRC16, exactly as the device computes it after flashing a
 * section: shift the data in LSB-first, push out 16 zero bits, then reverse
 * the register.
 */
pub fn device_crc16(data: &[u8]) -> u16 {
    let mut out: u16 = 0;

    for byte in data.iter() {
        for bit in 0..8 {
            let carry = out & 0x8000 != 0;
            out = (out << 1) | ((*byte >> bit) & 1) as u16;
            if carry {
                out ^= POLYNOMIAL;
            }
        }
    }

    // Augment with 16 zero bits
    for _ in 0..16 {
        let carry = out & 0x8000 != 0;
        out <<= 1;
        if carry {
            out ^= POLYNOMIAL;
        }
    }

    out.reverse_bits()
}

//----------------------------------------------------------------------------
// Tests
//----------------------------------------------------------------------------
