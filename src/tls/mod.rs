//! TLS identity for the proxy's HTTPS listener

mod issuer;

pub use issuer::{
    CertificateIssuer, IssuedCertificate, KEY_BITS, SUBJECT_COMMON_NAME, VALIDITY_DAYS,
};
