use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use serial_test::serial;

use dmetcas::drivers::active_space::{ActiveSpaceDriver, ActiveSpaceParams, ImpuritySelection};
use dmetcas::drivers::DmetCasDriver;
use dmetcas::interfaces::input::Input;
use dmetcas::meanfield::MeanFieldReference;

fn max_abs(a: &Array2<f64>) -> f64 {
    a.iter().fold(0.0f64, |acc, x| acc.max(x.abs()))
}

#[test]
#[serial]
fn test_active_space_construction_nontrivial_overlap() {
    // A 4-function basis with mild linear dependence between neighbours.
    let sao = array![
        [1.0, 0.3, 0.0, 0.0],
        [0.3, 1.0, 0.2, 0.0],
        [0.0, 0.2, 1.0, 0.1],
        [0.0, 0.0, 0.1, 1.0],
    ];
    // Densities from two doubly occupied near-atomic orbitals.
    let dm_spin = array![
        [0.9, 0.1, 0.0, 0.0],
        [0.1, 0.8, 0.05, 0.0],
        [0.0, 0.05, 0.2, 0.0],
        [0.0, 0.0, 0.0, 0.05],
    ];
    let mo_coefficients = Array2::eye(4);
    let mo_energies = array![-1.5, -0.7, 0.3, 1.1];

    let mf = MeanFieldReference::builder()
        .sao(sao.clone())
        .density_alpha(dm_spin.clone())
        .density_beta(dm_spin)
        .mo_coefficients(mo_coefficients)
        .mo_energies(mo_energies)
        .threshold(1e-6)
        .build()
        .unwrap();

    let params = ActiveSpaceParams::builder()
        .ncore(1)
        .ncas(2)
        .impurity(ImpuritySelection::Indices(vec![1]))
        .build()
        .unwrap();
    let mut driver = ActiveSpaceDriver::builder()
        .parameters(&params)
        .mean_field(&mf)
        .build()
        .unwrap();
    assert!(driver.run().is_ok());

    let partition = &driver.result().unwrap().partition;
    assert_eq!(partition.ncore(), 1);
    assert_eq!(partition.ncas(), 2);
    assert_eq!(partition.nimp(), 1);
    assert_eq!(partition.nbath(), 1);
    assert_eq!(partition.n_external(), 1);

    // Orthonormality with respect to the overlap metric.
    let m = partition.orbitals();
    let residual = m.t().dot(&sao).dot(m) - Array2::<f64>::eye(4);
    assert!(max_abs(&residual) < 1e-8);

    // Occupations are non-negative and the bath slicing is
    // occupation-descending.
    for occ in partition
        .core_occupations()
        .iter()
        .chain(partition.active_occupations().iter())
        .chain(partition.external_occupations().iter())
    {
        assert!(*occ >= -1e-10);
    }
    let bath_occs: Vec<f64> = partition
        .core_occupations()
        .iter()
        .chain(partition.active_occupations().iter().skip(partition.nimp()))
        .chain(partition.external_occupations().iter())
        .copied()
        .collect();
    assert!(bath_occs.windows(2).all(|w| w[0] >= w[1] - 1e-10));

    // Canonical energies ascend within each block.
    let active_e = partition.active_energies();
    assert!(active_e[0] <= active_e[1]);
}

#[test]
#[serial]
fn test_yaml_driven_construction_from_binaries() {
    let dir = std::env::temp_dir();
    let write = |name: &str, values: &[f64]| {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    };

    // Identity overlap, diagonal spin densities with spin-traced
    // occupations [2.0, 1.8, 0.6, 0.1].
    let sao = write("dmetcas_it_sao", &{
        let mut v = vec![0.0; 16];
        for i in 0..4 {
            v[i * 4 + i] = 1.0;
        }
        v
    });
    let d = [1.0, 0.9, 0.3, 0.05];
    let dm: Vec<f64> = (0..16)
        .map(|k| if k % 5 == 0 { d[k / 5] } else { 0.0 })
        .collect();
    let da = write("dmetcas_it_da", &dm);
    let db = write("dmetcas_it_db", &dm);
    let c = write("dmetcas_it_c", &{
        let mut v = vec![0.0; 16];
        for i in 0..4 {
            v[i * 4 + i] = 1.0;
        }
        v
    });
    let e = write("dmetcas_it_e", &[-2.0, -1.0, 0.5, 1.0]);

    let yaml = format!(
        r#"
mean_field:
  Binaries:
    nao: 4
    sao: {}
    density_alpha: {}
    density_beta: {}
    coefficients: {}
    mo_energies: {}
    basis_labels: ["0 Fe 4s", "0 Fe 3dxy", "1 N 2pz", "2 C 2s"]
active_space:
  ncore: 1
  ncas: 2
  impurity:
    Labels: ["Fe 3d", "N 2pz"]
  wavefunction_symmetry: Ag
"#,
        sao.display(),
        da.display(),
        db.display(),
        c.display(),
        e.display(),
    );

    let input: Input = serde_yaml::from_str(&yaml).unwrap();
    let partition = input.handle().unwrap();

    // Impurity: orbitals 1 and 2; bath candidates {0, 3} with occupations
    // {2.0, 0.1}: orbital 0 becomes the core, orbital 3 the external space.
    assert_eq!(partition.ncore(), 1);
    assert_eq!(partition.nimp(), 2);
    assert_eq!(partition.nbath(), 0);
    assert_abs_diff_eq!(partition.core_occupations()[0], 2.0, epsilon = 1e-10);
    assert_abs_diff_eq!(partition.external_occupations()[0], 0.1, epsilon = 1e-10);

    let m = partition.orbitals();
    let residual = m.t().dot(m) - Array2::<f64>::eye(4);
    assert!(max_abs(&residual) < 1e-8);

    for path in [sao, da, db, c, e] {
        std::fs::remove_file(path).unwrap();
    }
}
