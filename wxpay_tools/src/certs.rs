use anyhow::{anyhow, Result};
use wxpay_v2::{CertificateManager, MaterialKind, MerchantConfig};

pub fn print_certificate_paths(config: &MerchantConfig, directory: Option<String>) -> Result<()> {
    let manager = match directory {
        Some(dir) => CertificateManager::new(dir),
        None => CertificateManager::in_temp_dir(),
    };
    println!("----------------------------- Certificates -----------------------------");
    let mut found = false;
    for kind in [MaterialKind::Cert, MaterialKind::Key] {
        match manager.resolve(config, kind)? {
            Some(path) => {
                found = true;
                println!("{:<12}: {}", kind.to_string(), path.display());
            },
            None => println!("{:<12}: not configured", kind.to_string()),
        }
    }
    println!("------------------------------------------------------------------------");
    if found {
        Ok(())
    } else {
        Err(anyhow!("Neither WXPAY_CERT nor WXPAY_KEY is set"))
    }
}
