//! Dispositivo MPU6050 simulado para pruebas
//!
//! Simula el banco de 128 registros y la FIFO. Las muestras se generan bajo demanda:
//! cada lectura de FIFO_COUNT_H añade una muestra si la cola no contiene ya una
//! completa, con el formato que indica el registro FIFO_EN en ese momento.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use mpu6050_rs::config::RegisterImage;
use mpu6050_rs::interface::Interface;
use mpu6050_rs::register::registers;

/// Operación registrada por el mock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Read { address: u8, value: u8 },
    Write { address: u8, value: u8 },
}

/// Error simulado
#[derive(Debug, Clone, PartialEq)]
pub enum MockError {
    Communication,
}

const POWER_ON_PWR_MGMT_1: u8 = 0x40;
const WHO_AM_I_VALUE: u8 = 0x68;

struct MockState {
    registers: [u8; 128],
    fifo: VecDeque<u8>,
    count_low: u8,
    operations: Vec<Operation>,
    fail_next_read: bool,
    fail_next_write: bool,
    stuck: HashMap<u8, u8>,
    factory_accel_offsets: [i16; 3],
    accel: [i16; 3],
    temp: i16,
    gyro: [i16; 3],
    aux: [i16; 4],
    accel_stimulus: [i16; 3],
    gyro_stimulus: [i16; 3],
    producing: bool,
    empty_polls: usize,
}

impl MockState {
    fn new() -> Self {
        let mut state = Self {
            registers: [0; 128],
            fifo: VecDeque::new(),
            count_low: 0,
            operations: Vec::new(),
            fail_next_read: false,
            fail_next_write: false,
            stuck: HashMap::new(),
            factory_accel_offsets: [0; 3],
            accel: [0; 3],
            temp: 0,
            gyro: [0; 3],
            aux: [0; 4],
            accel_stimulus: [0; 3],
            gyro_stimulus: [0; 3],
            producing: true,
            empty_polls: 0,
        };
        state.power_on_reset();
        state
    }

    /// Valores tras un reset: todo a cero salvo sleep, WHO_AM_I y offsets de fábrica.
    /// PROD_ID y los registros de auto-test son de sólo lectura y se conservan.
    fn power_on_reset(&mut self) {
        let keep = [
            registers::PROD_ID,
            registers::SELF_TEST_X,
            registers::SELF_TEST_Y,
            registers::SELF_TEST_Z,
            registers::SELF_TEST_A,
        ];
        for addr in 0..128u8 {
            if !keep.contains(&addr) {
                self.registers[addr as usize] = 0;
            }
        }
        self.registers[registers::PWR_MGMT_1 as usize] = POWER_ON_PWR_MGMT_1;
        self.registers[registers::WHO_AM_I as usize] = WHO_AM_I_VALUE;
        let factory = self.factory_accel_offsets;
        for (axis, value) in factory.iter().enumerate() {
            self.set_word(registers::XA_OFFS_USRH + 2 * axis as u8, *value);
        }
        self.fifo.clear();
    }

    fn word(&self, addr: u8) -> i16 {
        i16::from_be_bytes([self.registers[addr as usize], self.registers[addr as usize + 1]])
    }

    fn set_word(&mut self, addr: u8, value: i16) {
        let [high, low] = value.to_be_bytes();
        self.registers[addr as usize] = high;
        self.registers[addr as usize + 1] = low;
    }

    fn frame(&self) -> Vec<i16> {
        let fifo_en = self.registers[registers::FIFO_EN as usize];
        let accel_config = self.registers[registers::ACCEL_CONFIG as usize];
        let gyro_config = self.registers[registers::GYRO_CONFIG as usize];
        let i2c_mst_ctrl = self.registers[registers::I2C_MST_CTRL as usize];
        let mut words = Vec::new();

        if fifo_en & 0x08 != 0 {
            for axis in 0..3 {
                let mut value = self.accel[axis];
                if accel_config & (0x80 >> axis) != 0 {
                    value = value.saturating_add(self.accel_stimulus[axis]);
                }
                words.push(value);
            }
        }
        if fifo_en & 0x80 != 0 {
            words.push(self.temp);
        }
        for axis in 0..3 {
            if fifo_en & (0x40 >> axis) != 0 {
                let mut value = self.gyro[axis].saturating_add(self.word(registers::XG_OFFS_USRH + 2 * axis as u8));
                if gyro_config & (0x80 >> axis) != 0 {
                    value = value.saturating_add(self.gyro_stimulus[axis]);
                }
                words.push(value);
            }
        }
        for slave in 0..3 {
            if fifo_en & (0x01 << slave) != 0 {
                words.push(self.aux[slave]);
            }
        }
        if i2c_mst_ctrl & 0x20 != 0 {
            words.push(self.aux[3]);
        }
        words
    }

    fn tick(&mut self) {
        if self.empty_polls > 0 {
            self.empty_polls -= 1;
            return;
        }
        let fifo_on = self.registers[registers::USER_CTRL as usize] & 0x40 != 0;
        if !self.producing || !fifo_on {
            return;
        }
        let frame = self.frame();
        if frame.is_empty() || self.fifo.len() >= 2 * frame.len() {
            return;
        }
        for word in frame {
            self.fifo.extend(word.to_be_bytes());
        }
    }

    fn read(&mut self, address: u8) -> Result<u8, MockError> {
        if self.fail_next_read {
            self.fail_next_read = false;
            return Err(MockError::Communication);
        }
        let value = if let Some(value) = self.stuck.get(&address) {
            *value
        } else {
            match address {
                registers::FIFO_COUNT_H => {
                    self.tick();
                    let [high, low] = (self.fifo.len() as u16).to_be_bytes();
                    self.count_low = low;
                    high
                }
                registers::FIFO_COUNT_L => self.count_low,
                registers::FIFO_R_W => self.fifo.pop_front().unwrap_or(0),
                _ => self.registers[address as usize],
            }
        };
        self.operations.push(Operation::Read { address, value });
        Ok(value)
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), MockError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(MockError::Communication);
        }
        self.operations.push(Operation::Write { address, value });
        if self.stuck.contains_key(&address) {
            return Ok(());
        }
        match address {
            registers::PWR_MGMT_1 if value & 0x80 != 0 => self.power_on_reset(),
            registers::USER_CTRL => {
                if value & 0x04 != 0 {
                    self.fifo.clear();
                }
                self.registers[address as usize] = value & !0x07;
            }
            registers::FIFO_R_W | registers::FIFO_COUNT_H | registers::FIFO_COUNT_L => {}
            _ => self.registers[address as usize] = value,
        }
        Ok(())
    }
}

/// Interfaz simulada; los clones comparten el mismo estado
#[derive(Clone)]
pub struct MockInterface {
    state: Rc<RefCell<MockState>>,
}

impl MockInterface {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState::new())),
        }
    }

    pub fn register(&self, address: u8) -> u8 {
        self.state.borrow().registers[address as usize]
    }

    pub fn set_register(&self, address: u8, value: u8) {
        self.state.borrow_mut().registers[address as usize] = value;
    }

    /// Palabra de 16 bits (byte alto en `address`)
    pub fn word(&self, address: u8) -> i16 {
        self.state.borrow().word(address)
    }

    /// Vuelca una imagen en los registros, como si el dispositivo ya estuviera configurado
    pub fn preload_image(&self, image: &RegisterImage) {
        let mut state = self.state.borrow_mut();
        for (reg, value) in image.entries() {
            state.registers[reg as usize] = value;
        }
    }

    pub fn set_product_id(&self, value: u8) {
        self.set_register(registers::PROD_ID, value);
    }

    /// Registros SELF_TEST_X, Y, Z y A
    pub fn set_self_test_registers(&self, values: [u8; 4]) {
        for (i, value) in values.iter().enumerate() {
            self.set_register(registers::SELF_TEST_X + i as u8, *value);
        }
    }

    /// Offsets de acelerómetro que restaura un reset
    pub fn set_factory_accel_offsets(&self, offsets: [i16; 3]) {
        let mut state = self.state.borrow_mut();
        state.factory_accel_offsets = offsets;
        for (axis, value) in offsets.iter().enumerate() {
            state.set_word(registers::XA_OFFS_USRH + 2 * axis as u8, *value);
        }
    }

    pub fn set_accel_data(&self, x: i16, y: i16, z: i16) {
        self.state.borrow_mut().accel = [x, y, z];
    }

    /// Salida del giroscopio antes de sumar los registros de offset
    pub fn set_gyro_data(&self, x: i16, y: i16, z: i16) {
        self.state.borrow_mut().gyro = [x, y, z];
    }

    pub fn set_temperature_data(&self, raw: i16) {
        self.state.borrow_mut().temp = raw;
    }

    pub fn set_aux_data(&self, values: [i16; 4]) {
        self.state.borrow_mut().aux = values;
    }

    /// Respuesta añadida a cada eje del acelerómetro con su bit de auto-test activo
    pub fn set_accel_stimulus(&self, response: [i16; 3]) {
        self.state.borrow_mut().accel_stimulus = response;
    }

    pub fn set_gyro_stimulus(&self, response: [i16; 3]) {
        self.state.borrow_mut().gyro_stimulus = response;
    }

    /// Mientras esté parado, la FIFO no recibe muestras nuevas
    pub fn set_producing(&self, producing: bool) {
        self.state.borrow_mut().producing = producing;
    }

    /// Las próximas `polls` lecturas del contador no generan muestras
    pub fn delay_polls(&self, polls: usize) {
        self.state.borrow_mut().empty_polls = polls;
    }

    /// Llena la FIFO por encima de su capacidad
    pub fn inject_overflow(&self, bytes: usize) {
        let mut state = self.state.borrow_mut();
        state.fifo.extend(std::iter::repeat(0xAA).take(bytes));
    }

    pub fn fifo_len(&self) -> usize {
        self.state.borrow().fifo.len()
    }

    /// Registro que ignora las escrituras y siempre devuelve `value`
    pub fn stick_register(&self, address: u8, value: u8) {
        self.state.borrow_mut().stuck.insert(address, value);
    }

    pub fn fail_next_read(&self) {
        self.state.borrow_mut().fail_next_read = true;
    }

    pub fn fail_next_write(&self) {
        self.state.borrow_mut().fail_next_write = true;
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }

    /// Direcciones escritas, en orden
    pub fn written_addresses(&self) -> Vec<u8> {
        self.state
            .borrow()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Write { address, .. } => Some(*address),
                Operation::Read { .. } => None,
            })
            .collect()
    }

    /// Valores escritos en un registro, en orden
    pub fn writes_to(&self, target: u8) -> Vec<u8> {
        self.state
            .borrow()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Write { address, value } if *address == target => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl Interface for MockInterface {
    type Error = MockError;

    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        for (i, value) in data.iter().enumerate() {
            state.write(reg + i as u8, *value)?;
        }
        Ok(())
    }

    fn read_reg(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        for (i, value) in data.iter_mut().enumerate() {
            let address = if reg == registers::FIFO_R_W { reg } else { reg + i as u8 };
            *value = state.read(address)?;
        }
        Ok(())
    }
}
