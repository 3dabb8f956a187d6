use std::path::Path;

use x509_cert::Certificate;
use x509_cert::der::{Decode, Reader, SliceReader};

use super::KeyError;

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// A parsed certificate together with the DER bytes it was read from.
#[derive(Debug, Clone)]
pub struct ChainCertificate {
    pub certificate: Certificate,
    pub der: Vec<u8>,
}

/// Loads the certificate chain stored at `path`, leaf first.
///
/// PEM input yields every `CERTIFICATE` block in file order and skips other
/// block types. Input without any PEM block is read as concatenated DER.
pub fn load_certificate_chain(path: impl AsRef<Path>) -> Result<Vec<ChainCertificate>, KeyError> {
    let data = std::fs::read(path.as_ref()).map_err(KeyError::ReadCertificate)?;
    let chain = parse_certificates(&data)?;
    if chain.is_empty() {
        return Err(KeyError::NoCertificate);
    }
    Ok(chain)
}

fn parse_certificates(data: &[u8]) -> Result<Vec<ChainCertificate>, KeyError> {
    let blocks = pem::parse_many(data).map_err(|e| KeyError::ParseCertificate(e.to_string()))?;
    if blocks.is_empty() {
        return parse_der_sequence(data);
    }

    blocks
        .iter()
        .filter(|block| block.tag() == CERTIFICATE_TAG)
        .map(|block| {
            let certificate = Certificate::from_der(block.contents())
                .map_err(|e| KeyError::ParseCertificate(e.to_string()))?;
            Ok(ChainCertificate {
                certificate,
                der: block.contents().to_vec(),
            })
        })
        .collect()
}

fn parse_der_sequence(data: &[u8]) -> Result<Vec<ChainCertificate>, KeyError> {
    let parse_error = |e: x509_cert::der::Error| KeyError::ParseCertificate(e.to_string());
    let offset =
        |reader: &SliceReader<'_>| usize::try_from(reader.position()).map_err(parse_error);
    let mut reader = SliceReader::new(data).map_err(parse_error)?;
    let mut chain = Vec::new();
    while !reader.is_finished() {
        let start = offset(&reader)?;
        let certificate = Certificate::decode(&mut reader).map_err(parse_error)?;
        let end = offset(&reader)?;
        // Keep the bytes as read rather than a re-encoding.
        chain.push(ChainCertificate {
            certificate,
            der: data[start..end].to_vec(),
        });
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
    }

    fn common_name(cert: &ChainCertificate) -> String {
        cert.certificate.tbs_certificate.subject.to_string()
    }

    #[test]
    fn loads_single_pem_certificate() {
        let chain = load_certificate_chain(fixture("ec-256.crt")).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(common_name(&chain[0]).contains("CN=ec-256"));
    }

    #[test]
    fn preserves_chain_order() {
        let chain = load_certificate_chain(fixture("chain.pem")).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(common_name(&chain[0]).contains("CN=leaf"));
        assert!(common_name(&chain[1]).contains("CN=ec-384"));
    }

    #[test]
    fn der_bytes_match_pem_contents() {
        let chain = load_certificate_chain(fixture("ec-256.crt")).unwrap();
        let der = std::fs::read(fixture("ec-256.der")).unwrap();
        assert_eq!(chain[0].der, der);
    }

    #[test]
    fn falls_back_to_der() {
        let chain = load_certificate_chain(fixture("ec-256.der")).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(common_name(&chain[0]).contains("CN=ec-256"));
    }

    #[test]
    fn der_sequence_keeps_each_certificate_as_read() {
        let first = std::fs::read(fixture("ec-256.der")).unwrap();
        let second = load_certificate_chain(fixture("rsa-2048.crt")).unwrap().remove(0).der;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&first).unwrap();
        file.write_all(&second).unwrap();

        let chain = load_certificate_chain(file.path()).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].der, first);
        assert_eq!(chain[1].der, second);
        assert!(common_name(&chain[1]).contains("CN=rsa-2048"));
    }

    #[test]
    fn empty_file_has_no_certificate() {
        let err = load_certificate_chain(fixture("empty.pem")).unwrap_err();
        assert!(matches!(err, KeyError::NoCertificate));
        assert_eq!(err.to_string(), "no certificate found");
    }

    #[test]
    fn skips_non_certificate_blocks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&std::fs::read(fixture("ec-256.key")).unwrap()).unwrap();
        file.write_all(&std::fs::read(fixture("rsa-2048.crt")).unwrap()).unwrap();

        let chain = load_certificate_chain(file.path()).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(common_name(&chain[0]).contains("CN=rsa-2048"));
    }

    #[test]
    fn key_only_file_has_no_certificate() {
        let err = load_certificate_chain(fixture("ec-256.key")).unwrap_err();
        assert!(matches!(err, KeyError::NoCertificate));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_certificate_chain(dir.path().join("missing.crt")).unwrap_err();
        assert!(matches!(err, KeyError::ReadCertificate(_)));
        assert!(err.to_string().starts_with("failed to read certificate file: "));
    }

    #[test]
    fn corrupt_certificate_block_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-----BEGIN CERTIFICATE-----").unwrap();
        writeln!(file, "bm90IGEgY2VydGlmaWNhdGU=").unwrap();
        writeln!(file, "-----END CERTIFICATE-----").unwrap();

        let err = load_certificate_chain(file.path()).unwrap_err();
        assert!(matches!(err, KeyError::ParseCertificate(_)), "{err}");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a certificate").unwrap();

        let err = load_certificate_chain(file.path()).unwrap_err();
        assert!(matches!(err, KeyError::ParseCertificate(_)), "{err}");
    }
}
