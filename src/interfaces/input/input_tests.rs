use crate::drivers::active_space::ImpuritySelection;
use crate::interfaces::input::{Input, MeanFieldSource};
use crate::orthogonalisation::OrthogonalisationKind;

#[test]
fn test_interfaces_input_yaml_full() {
    let yaml = r#"
mean_field:
  Binaries:
    nao: 4
    sao: data/sao.bin
    density_alpha: data/da.bin
    density_beta: data/db.bin
    coefficients: data/c.bin
    mo_energies: data/e.bin
    basis_labels: ["0 Fe 3dxy", "0 Fe 3dyz", "1 N 2pz", "2 C 2s"]
active_space:
  ncore: 1
  ncas: 2
  impurity:
    Labels: ["Fe 3d"]
  orthogonalisation: Canonical
  wavefunction_symmetry: B1g
  verbose: 1
"#;
    let input: Input = serde_yaml::from_str(yaml).unwrap();
    let MeanFieldSource::Binaries(source) = &input.mean_field;
    assert_eq!(source.nao, 4);
    assert_eq!(source.basis_labels.as_ref().unwrap().len(), 4);

    assert_eq!(input.active_space.ncore, 1);
    assert_eq!(input.active_space.ncas, 2);
    assert_eq!(
        input.active_space.impurity,
        ImpuritySelection::Labels(vec!["Fe 3d".to_string()])
    );
    assert_eq!(
        input.active_space.orthogonalisation,
        OrthogonalisationKind::Canonical
    );
    assert_eq!(input.active_space.wavefunction_symmetry.as_deref(), Some("B1g"));
}

#[test]
fn test_interfaces_input_yaml_defaults() {
    let yaml = r#"
mean_field:
  Binaries:
    nao: 2
    sao: data/sao.bin
    density_alpha: data/da.bin
    density_beta: data/db.bin
    coefficients: data/c.bin
    mo_energies: data/e.bin
active_space:
  ncore: 0
  ncas: 1
  impurity:
    Indices: [0]
"#;
    let input: Input = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        input.active_space.orthogonalisation,
        OrthogonalisationKind::Symmetric
    );
    assert!((input.active_space.linear_independence_threshold - 1e-8).abs() < 1e-20);
    assert!(input.active_space.wavefunction_symmetry.is_none());
    assert_eq!(input.active_space.verbose, 0);
    assert!(input.active_space.result_save_name.is_none());
}
