use crate::error::Result;
use tisc::core::material::MaterialKind;

fn render() -> String {
    let mut table = format!("{:<10} {:>8}  {}\n", "VARIANT", "ORBITALS", "DESCRIPTION");
    for kind in MaterialKind::ALL {
        table.push_str(&format!(
            "{:<10} {:>8}  {}\n",
            kind.tag(),
            kind.required_orbitals(),
            kind.description()
        ));
    }
    table
}

pub fn run() -> Result<()> {
    print!("{}", render());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_is_listed_with_its_orbital_count() {
        let table = render();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), MaterialKind::ALL.len() + 1);
        assert!(lines[0].starts_with("VARIANT"));

        let tci8 = lines.iter().find(|l| l.starts_with("tci-8")).unwrap();
        assert_eq!(tci8.split_whitespace().nth(1), Some("8"));
        let dirac = lines.iter().find(|l| l.starts_with("dirac-ti")).unwrap();
        assert_eq!(dirac.split_whitespace().nth(1), Some("4"));
    }
}
