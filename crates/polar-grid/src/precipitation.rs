//! Hemispheric power and number flux of auroral precipitation.
//!
//! Each species' number flux density is built from model fields with its own
//! empirical calibration, then integrated over the shell like any other
//! density. The constants below come from the precipitation model and are
//! kept as given.

use std::ops::{Index, IndexMut};

use serde::Serialize;
use tracing::debug;

use iono_common::{FieldGrid, Hemisphere, IonoFields, PrecipitationSpecies};

use crate::config::IntegrationConfig;
use crate::error::{GridError, Result};
use crate::integrate::{
    CellSelector, GridSpacing, SurfaceIntegrator, ELEMENTARY_CHARGE, MICRO, PER_CM2_TO_PER_M2,
    WATT_TO_GIGAWATT,
};

/// keV to K
const KEV_TO_KELVIN: f64 = 1e3 * 11604.0;

/// Ion temperatures scale by this factor relative to the mean energy.
const ION_TEMPERATURE_FACTOR: f64 = 5.0;

const ELECTRON_DIFFUSE_FACTOR: f64 = 1553.5632;
const ION_DIFFUSE_FACTOR: f64 = 36.26531;
const PARTICLE_MASS_SCALE: f64 = 1.66e-21;

/// Integrated precipitation of one species in one hemisphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PrecipitationTotals {
    /// Particles per second
    pub number_flux: f64,
    /// GW
    pub energy_flux: f64,
}

/// One `PrecipitationTotals` per species, keyed by the model field prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpeciesTable {
    pub diff: PrecipitationTotals,
    pub idif: PrecipitationTotals,
    pub mono: PrecipitationTotals,
    pub bbnd: PrecipitationTotals,
}

impl SpeciesTable {
    pub fn iter(&self) -> impl Iterator<Item = (PrecipitationSpecies, &PrecipitationTotals)> {
        PrecipitationSpecies::ALL
            .into_iter()
            .map(move |species| (species, &self[species]))
    }

    /// Hemispheric power: energy flux summed over species, GW.
    pub fn total_power(&self) -> f64 {
        self.iter().map(|(_, t)| t.energy_flux).sum()
    }

    pub fn total_number_flux(&self) -> f64 {
        self.iter().map(|(_, t)| t.number_flux).sum()
    }
}

impl Index<PrecipitationSpecies> for SpeciesTable {
    type Output = PrecipitationTotals;

    fn index(&self, species: PrecipitationSpecies) -> &Self::Output {
        match species {
            PrecipitationSpecies::ElectronDiffuse => &self.diff,
            PrecipitationSpecies::IonDiffuse => &self.idif,
            PrecipitationSpecies::Monoenergetic => &self.mono,
            PrecipitationSpecies::Broadband => &self.bbnd,
        }
    }
}

impl IndexMut<PrecipitationSpecies> for SpeciesTable {
    fn index_mut(&mut self, species: PrecipitationSpecies) -> &mut Self::Output {
        match species {
            PrecipitationSpecies::ElectronDiffuse => &mut self.diff,
            PrecipitationSpecies::IonDiffuse => &mut self.idif,
            PrecipitationSpecies::Monoenergetic => &mut self.mono,
            PrecipitationSpecies::Broadband => &mut self.bbnd,
        }
    }
}

/// Precipitation for both hemispheres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HemisphericPower {
    pub north: SpeciesTable,
    pub south: SpeciesTable,
}

impl HemisphericPower {
    pub fn hemisphere(&self, hemisphere: Hemisphere) -> &SpeciesTable {
        match hemisphere {
            Hemisphere::North => &self.north,
            Hemisphere::South => &self.south,
        }
    }
}

struct HemisphereFields<'a, F: ?Sized> {
    fields: &'a F,
    hemisphere: Hemisphere,
}

impl<'a, F: IonoFields + ?Sized> HemisphereFields<'a, F> {
    fn get(&self, name: &str) -> Result<&'a FieldGrid> {
        self.fields
            .field(self.hemisphere, name)
            .ok_or_else(|| GridError::missing_field(self.hemisphere, name))
    }

    fn species(&self, species: PrecipitationSpecies, suffix: &str) -> Result<&'a FieldGrid> {
        self.get(&format!("{}_{}", species.key(), suffix))
    }
}

/// `rt_rho * sqrt(ave_e * keV->K * scale) * factor / mass`, per cm².
fn diffuse_number_flux(rho: &FieldGrid, ave_e: &FieldGrid, scale: f64, factor: f64) -> Result<FieldGrid> {
    Ok(rho.zip_map(ave_e, |rho, ave| {
        let t = ave * KEV_TO_KELVIN * scale;
        rho * t.sqrt() * factor / PARTICLE_MASS_SCALE
    })?)
}

fn species_totals<F: IonoFields + ?Sized>(
    integrator: &SurfaceIntegrator,
    source: &HemisphereFields<'_, F>,
    colat: &FieldGrid,
    species: PrecipitationSpecies,
) -> Result<PrecipitationTotals> {
    let number_flux = match species {
        PrecipitationSpecies::ElectronDiffuse | PrecipitationSpecies::IonDiffuse => {
            let (scale, factor) = if species == PrecipitationSpecies::IonDiffuse {
                (ION_TEMPERATURE_FACTOR, ION_DIFFUSE_FACTOR)
            } else {
                (1.0, ELECTRON_DIFFUSE_FACTOR)
            };
            let density = diffuse_number_flux(
                source.get("rt rho")?,
                source.species(species, "ave-e")?,
                scale,
                factor,
            )?;
            integrator.integrate(&density, colat, PER_CM2_TO_PER_M2, CellSelector::All)?
        }
        // Upward current carries precipitating electrons.
        PrecipitationSpecies::Monoenergetic => {
            let electrons = source.get("jr")?.map(|jr| jr / ELEMENTARY_CHARGE);
            integrator.integrate(&electrons, colat, MICRO, CellSelector::Positive)?
        }
        PrecipitationSpecies::Broadband => integrator.integrate(
            source.species(species, "n-flux")?,
            colat,
            PER_CM2_TO_PER_M2,
            CellSelector::All,
        )?,
    };

    let energy_flux = integrator.integrate(
        source.species(species, "e-flux")?,
        colat,
        WATT_TO_GIGAWATT,
        CellSelector::All,
    )?;

    Ok(PrecipitationTotals {
        number_flux,
        energy_flux,
    })
}

/// Number and energy flux per species for one hemisphere.
pub fn calc_species_table<F: IonoFields + ?Sized>(
    fields: &F,
    hemisphere: Hemisphere,
    config: &IntegrationConfig,
) -> Result<SpeciesTable> {
    let spacing = GridSpacing::from_iono(fields)?;
    let integrator = SurfaceIntegrator::with_config(spacing, config);
    let source = HemisphereFields { fields, hemisphere };
    let colat = source.get("theta")?;

    let mut table = SpeciesTable::default();
    for species in PrecipitationSpecies::ALL {
        table[species] = species_totals(&integrator, &source, colat, species)?;
    }

    debug!(
        %hemisphere,
        power_gw = table.total_power(),
        number_flux = table.total_number_flux(),
        "Integrated precipitation"
    );
    Ok(table)
}

/// Hemispheric power and number flux for every species in both hemispheres.
pub fn calc_hemispheric_power<F: IonoFields + ?Sized>(
    fields: &F,
    config: &IntegrationConfig,
) -> Result<HemisphericPower> {
    Ok(HemisphericPower {
        north: calc_species_table(fields, Hemisphere::North, config)?,
        south: calc_species_table(fields, Hemisphere::South, config)?,
    })
}
