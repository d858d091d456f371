use ratlite_core::config::Config;
use ratlite_core::diagnostics::Diagnostic;
use ratlite_core::params::CutoutParams;
use ratlite_core::{Cutout, CutoutBuilder, CutoutError, CutoutResult};
use ratlite_datasets::{BUILTIN_MODULES, ERA5};
use std::path::Path;

fn declare(dir: &Path, name: &str, params: CutoutParams) -> CutoutResult<Cutout> {
    CutoutBuilder::new(name)
        .with_config(Config::default())
        .with_working_dir(dir)
        .with_params(params)
        .build()
}

#[test]
fn declare_on_every_builtin() {
    let dir = tempfile::tempdir().unwrap();
    for name in BUILTIN_MODULES {
        let params = CutoutParams::new()
            .with_module(name)
            .with_x(5.0, 7.0)
            .with_y(47.0, 46.0)
            .with_time("2012-06-01", "2012-06-01");
        let cutout = declare(dir.path(), name, params).unwrap();

        let module = cutout.module();
        assert_eq!(module.name, name);
        assert_eq!(cutout.projection(), module.projection);
        assert_eq!(cutout.available_features(), module.feature_names());
        assert_eq!(
            cutout.coords().time.len() as i64,
            24 * 60 / module.dt_minutes
        );
        let (ny, nx) = cutout.shape();
        assert!(nx >= 2 && ny >= 2, "{}: {:?}", name, cutout.shape());
    }
}

#[test]
fn era5_is_the_default() {
    let dir = tempfile::tempdir().unwrap();
    let params = CutoutParams::new()
        .with_x(5.0, 7.0)
        .with_y(46.0, 47.0)
        .with_time("2012-06", "2012-06");
    let cutout = declare(dir.path(), "alps", params).unwrap();

    assert_eq!(cutout.module(), &ERA5);
    assert_eq!(cutout.shape(), (5, 9));
    assert!(cutout.diagnostics().contains(&Diagnostic::ModuleDefaulted {
        module: "era5".to_string()
    }));
}

#[test]
fn unknown_module() {
    let dir = tempfile::tempdir().unwrap();
    let params = CutoutParams::new()
        .with_module("merra2")
        .with_x(5.0, 7.0)
        .with_y(46.0, 47.0)
        .with_time("2012", "2012");
    match declare(dir.path(), "merra", params) {
        Err(CutoutError::UnknownModule(name)) => assert_eq!(name, "merra2"),
        other => panic!("unexpected {:?}", other),
    }
}
