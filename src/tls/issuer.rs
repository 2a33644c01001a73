//! Self-signed identity for the proxy's HTTPS listener

use rand::rngs::OsRng;
use rand::Rng;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose, SerialNumber,
};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use std::path::Path;

use crate::error::{Error, Result};
use crate::layout::{CERT_FILE, KEY_FILE};
use crate::persist;

/// RSA modulus size
pub const KEY_BITS: usize = 2048;

/// Validity window of every issued certificate
pub const VALIDITY_DAYS: i64 = 365;

pub const SUBJECT_COMMON_NAME: &str = "redirector-cert";
pub const SUBJECT_ORGANIZATION: &str = "redirector";
pub const SUBJECT_COUNTRY: &str = "US";

/// Freshly generated certificate and key
pub struct IssuedCertificate {
    /// PEM-encoded certificate (`CERTIFICATE`)
    pub cert_pem: String,
    /// PEM-encoded PKCS#1 private key (`RSA PRIVATE KEY`)
    pub key_pem: String,
    /// Serial number drawn for this certificate
    pub serial: u128,
}

impl IssuedCertificate {
    /// Generate a new key pair and self-signed certificate
    pub fn generate() -> Result<Self> {
        let private_key = RsaPrivateKey::new(&mut OsRng, KEY_BITS)
            .map_err(|e| Error::certificate(format!("error while generating key pair: {}", e)))?;

        let key_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| Error::certificate(format!("Failed to encode private key: {}", e)))?
            .to_string();

        // rcgen signs with a PKCS#8 view of the same key
        let pkcs8_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::certificate(format!("Failed to encode private key: {}", e)))?;
        let key_pair = KeyPair::from_pem_and_sign_algo(&pkcs8_pem, &rcgen::PKCS_RSA_SHA256)
            .map_err(|e| Error::certificate(format!("Failed to load signing key: {}", e)))?;

        let serial: u128 = OsRng.gen();
        let params = Self::params(serial);

        let cert = params.self_signed(&key_pair).map_err(|e| {
            Error::certificate(format!("error while generating certificate: {}", e))
        })?;

        Ok(Self {
            cert_pem: cert.pem(),
            key_pem,
            serial,
        })
    }

    fn params(serial: u128) -> CertificateParams {
        let mut params = CertificateParams::default();

        let mut name = DistinguishedName::new();
        name.push(DnType::CommonName, SUBJECT_COMMON_NAME);
        name.push(DnType::OrganizationName, SUBJECT_ORGANIZATION);
        name.push(DnType::CountryName, SUBJECT_COUNTRY);
        params.distinguished_name = name;

        params.serial_number = Some(serial_number(serial));

        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyEncipherment,
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyCertSign,
        ];
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ClientAuth,
            ExtendedKeyUsagePurpose::ServerAuth,
        ];

        // Whole seconds, so the encoded window is exactly VALIDITY_DAYS
        let now = time::OffsetDateTime::now_utc();
        params.not_before = now.replace_nanosecond(0).unwrap_or(now);
        params.not_after = params.not_before + time::Duration::days(VALIDITY_DAYS);

        params
    }

    /// Save the certificate and key to files
    pub fn save(&self, cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<()> {
        persist::write_atomic(cert_path.as_ref(), self.cert_pem.as_bytes(), 0o644)?;
        persist::write_atomic(key_path.as_ref(), self.key_pem.as_bytes(), 0o600)?;
        Ok(())
    }
}

/// Minimal big-endian encoding; DER integers must not carry leading zeros
fn serial_number(serial: u128) -> SerialNumber {
    let bytes = serial.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    SerialNumber::from_slice(&bytes[start..])
}

/// Issues the proxy's TLS identity into a data directory
#[derive(Debug, Default, Clone, Copy)]
pub struct CertificateIssuer;

impl CertificateIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Replace `cert.pem` and `key.pem` in `out_dir` with new material.
    ///
    /// Existing files are deleted before generation starts. If generation
    /// then fails, the old material is gone.
    pub fn issue(&self, out_dir: &Path) -> Result<IssuedCertificate> {
        let cert_path = out_dir.join(CERT_FILE);
        let key_path = out_dir.join(KEY_FILE);

        persist::ensure_dir(out_dir)?;
        for path in [&cert_path, &key_path] {
            if persist::remove_if_exists(path)? {
                tracing::info!(path = %path.display(), "Removed previous material");
            }
        }

        tracing::info!(bits = KEY_BITS, "Generating certificate and key pair");
        let issued = IssuedCertificate::generate()?;
        issued.save(&cert_path, &key_path)?;

        tracing::info!(
            cert = %cert_path.display(),
            key = %key_path.display(),
            serial = %format!("{:x}", issued.serial),
            "Certificate and key saved"
        );
        Ok(issued)
    }
}
